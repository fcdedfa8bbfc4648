//! 計劃引擎參數配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Result;

/// 計劃引擎參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// 高庫位警示比例（期末庫存 > 容量 × 比例 時警示）
    pub high_water_ratio: Decimal,

    /// 配方百分比總和的容許誤差（百分點）
    pub recipe_tolerance: Decimal,

    /// 是否以多執行緒計算各儲倉/設備的時間序列
    pub parallel: bool,

    /// 沒有允許物料的儲倉是否列入警示摘要
    pub include_inactive_storages_in_alerts: bool,
}

impl PlannerConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            high_water_ratio: Decimal::new(75, 2),
            recipe_tolerance: Decimal::new(1, 1),
            parallel: true,
            include_inactive_storages_in_alerts: false,
        }
    }

    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 建構器模式：設置高庫位警示比例
    pub fn with_high_water_ratio(mut self, ratio: Decimal) -> Self {
        self.high_water_ratio = ratio;
        self
    }

    /// 建構器模式：設置配方容許誤差
    pub fn with_recipe_tolerance(mut self, tolerance: Decimal) -> Self {
        self.recipe_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置是否並行計算
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 建構器模式：設置空儲倉是否列入警示
    pub fn with_inactive_storages_in_alerts(mut self, include: bool) -> Self {
        self.include_inactive_storages_in_alerts = include;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new()
    }
}
