//! # Plan Core
//!
//! 水泥廠生產計劃的核心資料模型與類型定義

pub mod actuals;
pub mod calendar;
pub mod campaign;
pub mod config;
pub mod facility;
pub mod input;
pub mod plan;
pub mod recipe;

// Re-export 主要類型
pub use actuals::{Actuals, ForecastRecord, InventoryActual, ProductionActual, ShipmentActual};
pub use calendar::{end_of_month, end_of_year, is_weekday, DateSpine, ShippingCalendar};
pub use campaign::{CampaignBlock, CampaignStatus, DailyCampaign};
pub use config::PlannerConfig;
pub use facility::{Capability, Equipment, EquipmentType, Material, MaterialCategory, Storage};
pub use input::{PlanScope, PlanningInput};
pub use plan::{
    Constraint, ConstraintKind, EquipmentDayResult, IdleCause, ProductOutput, QuantitySource,
    Severity, StorageDayResult,
};
pub use recipe::{Recipe, RecipeComponent};

/// 計劃引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("無效的日期範圍: {0}")]
    MalformedRange(String),

    #[error("無效的排程區塊: {0}")]
    InvalidCampaign(String),

    #[error("快照解析錯誤: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;
