//! # Plan Calculation Engine
//!
//! 生產與庫存模擬引擎

pub mod actuals;
pub mod alert;
pub mod balance;
pub mod calculator;
pub mod campaign;
pub mod forecast;
pub mod production;
pub mod rate_helper;
pub mod recipe;
pub mod summary;

// Re-export 主要類型
pub use actuals::ActualsLedger;
pub use alert::{AlertClassifier, Classification};
pub use balance::{BalanceSimulator, DailyFlows};
pub use calculator::PlanCalculator;
pub use campaign::{CampaignSchedule, DayAssignment};
pub use forecast::{ForecastGenerator, ForecastHorizon, ForecastMethod};
pub use production::{EquipmentTimeline, ProductionEngine};
pub use rate_helper::{RateEstimate, RateHelper, RateSource};
pub use recipe::{RecipeResolution, RecipeResolver, ResolvedRecipe};
pub use summary::{AlertRange, AlertSummary, StorageAlert};

use chrono::NaiveDate;
use plan_core::{EquipmentDayResult, StorageDayResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 計劃計算結果
///
/// 相同輸入必須產生完全相同的結果，因此只使用有序映射，也不記錄計算耗時。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    /// 日期軸
    pub dates: Vec<NaiveDate>,

    /// 儲倉時間序列（索引與 `dates` 對齊）
    pub storages: BTreeMap<String, Vec<StorageDayResult>>,

    /// 設備時間序列（索引與 `dates` 對齊）
    pub equipment: BTreeMap<String, Vec<EquipmentDayResult>>,

    /// 警示摘要
    pub alerts: AlertSummary,

    /// 警告信息
    pub warnings: BTreeSet<PlanWarning>,
}

impl PlanResult {
    /// 取得某儲倉某天的結果
    pub fn storage_day(&self, storage_id: &str, date: NaiveDate) -> Option<&StorageDayResult> {
        let index = self.index_of(date)?;
        self.storages.get(storage_id)?.get(index)
    }

    /// 取得某設備某天的結果
    pub fn equipment_day(&self, equipment_id: &str, date: NaiveDate) -> Option<&EquipmentDayResult> {
        let index = self.index_of(date)?;
        self.equipment.get(equipment_id)?.get(index)
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PlanWarning) {
        self.warnings.insert(warning);
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &PlanWarning> + '_ {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let first = *self.dates.first()?;
        if date < first {
            return None;
        }
        let index = (date - first).num_days() as usize;
        (index < self.dates.len()).then_some(index)
    }
}

/// 警告類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// 引用了不存在的設備/產品/產能，以零貢獻處理
    ConfigurationGap,
    /// 手動百分比已超過 100，自動組成被截為 0
    OverAllocatedRecipe,
    /// 配方沒有自動組成且總和不等於 100
    UnbalancedRecipe,
    /// 無效的排程區塊，已略過
    InvalidCampaign,
}

/// 計劃警告
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PlanWarning {
    pub kind: WarningKind,
    pub subject_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PlanWarning {
    pub fn new(
        kind: WarningKind,
        subject_id: String,
        message: String,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            kind,
            subject_id,
            message,
            severity,
        }
    }

    pub fn info(kind: WarningKind, subject_id: String, message: String) -> Self {
        Self::new(kind, subject_id, message, WarningSeverity::Info)
    }

    pub fn warning(kind: WarningKind, subject_id: String, message: String) -> Self {
        Self::new(kind, subject_id, message, WarningSeverity::Warning)
    }

    pub fn error(kind: WarningKind, subject_id: String, message: String) -> Self {
        Self::new(kind, subject_id, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
