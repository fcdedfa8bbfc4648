//! # Cement Plan
//!
//! 水泥廠生產與庫存模擬
//!
//! 由工廠配置、設備產能、排程區塊、配方與實績/預測，
//! 逐日計算每個儲倉的庫存與每台設備的產量，並標記缺貨與滿倉。
//!
//! ```no_run
//! use cement_plan::{logging, DateSpine, PlanCalculator, PlanScope, PlannerConfig, PlanningInput};
//!
//! logging::init();
//! let input = PlanningInput::from_json("{}").unwrap();
//! let spine = DateSpine::new(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 365).unwrap();
//! let result = PlanCalculator::new(PlannerConfig::default())
//!     .calculate(&input, &PlanScope::all_facilities(spine))
//!     .unwrap();
//! println!("警示 {} 筆", result.alerts.len());
//! ```

pub mod logging;

pub use plan_calc::{
    ActualsLedger, AlertClassifier, AlertRange, AlertSummary, CampaignSchedule, ForecastGenerator,
    ForecastHorizon, ForecastMethod, PlanCalculator, PlanResult, PlanWarning, RateEstimate,
    RateHelper, RateSource, RecipeResolution, RecipeResolver, StorageAlert, WarningKind,
    WarningSeverity,
};
pub use plan_core::*;
