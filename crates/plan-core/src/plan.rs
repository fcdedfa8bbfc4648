//! 計劃結果模型（每個儲倉/設備每天一格）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignStatus;

/// 數量來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantitySource {
    /// 實績
    Actual,
    /// 計劃
    Plan,
}

/// 庫存健康等級
///
/// 每格只會有一個等級。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// 正常
    Normal,
    /// 接近容量上限
    #[serde(rename = "high75")]
    NearCapacity,
    /// 超出容量
    Full,
    /// 缺貨
    Stockout,
}

impl Severity {
    pub fn is_alert(&self) -> bool {
        *self != Severity::Normal
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::NearCapacity => "high75",
            Severity::Full => "full",
            Severity::Stockout => "stockout",
        }
    }
}

/// 限制類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// 排程產量超過設備產能，已截斷
    Capped,
}

/// 套用於設備產量的限制
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub reason: String,
}

impl Constraint {
    pub fn capped(reason: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::Capped,
            reason: reason.into(),
        }
    }
}

/// 閒置原因（僅供顯示，不參與物料平衡）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum IdleCause {
    /// 設備可生產的產品在同廠儲倉缺貨
    Stockout { product_id: String },
}

/// 單一產品的產出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOutput {
    pub product_id: String,
    pub quantity: Decimal,
}

/// 設備單日結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDayResult {
    pub date: NaiveDate,

    pub status: CampaignStatus,

    /// 主要產品
    pub product_id: Option<String>,

    /// 當日總產量
    pub quantity: Decimal,

    pub source: QuantitySource,

    pub constraint: Option<Constraint>,

    /// 排程要求生產但設備沒有該產品的產能
    pub configuration_error: bool,

    pub idle_cause: Option<IdleCause>,

    /// 各產品產出（入庫依此計算）
    pub outputs: Vec<ProductOutput>,
}

impl EquipmentDayResult {
    /// 創建無產出的單日結果
    pub fn stopped(date: NaiveDate, status: CampaignStatus) -> Self {
        Self {
            date,
            status,
            product_id: None,
            quantity: Decimal::ZERO,
            source: QuantitySource::Plan,
            constraint: None,
            configuration_error: false,
            idle_cause: None,
            outputs: Vec::new(),
        }
    }

    /// 創建計劃生產的單日結果
    pub fn planned(date: NaiveDate, product_id: String, quantity: Decimal) -> Self {
        Self {
            date,
            status: CampaignStatus::Produce,
            outputs: vec![ProductOutput {
                product_id: product_id.clone(),
                quantity,
            }],
            product_id: Some(product_id),
            quantity,
            source: QuantitySource::Plan,
            constraint: None,
            configuration_error: false,
            idle_cause: None,
        }
    }

    /// 建構器模式：設置限制
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn is_producing(&self) -> bool {
        self.status == CampaignStatus::Produce && !self.outputs.is_empty()
    }

    pub fn is_actual(&self) -> bool {
        self.source == QuantitySource::Actual
    }

    pub fn is_capped(&self) -> bool {
        matches!(
            self.constraint,
            Some(Constraint {
                kind: ConstraintKind::Capped,
                ..
            })
        )
    }
}

/// 儲倉單日結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDayResult {
    pub date: NaiveDate,

    /// 期初庫存
    pub bod: Decimal,

    /// 入庫（生產）
    pub inflow: Decimal,

    /// 出貨（實績或預測）
    pub shipments: Decimal,

    /// 配方耗用
    pub consumption: Decimal,

    /// 出庫合計 = 出貨 + 耗用
    pub outflow: Decimal,

    /// 期末庫存 = 期初 + 入庫 - 出庫（不做下限截斷）
    pub eod: Decimal,

    pub severity: Severity,

    pub reason: Option<String>,

    /// 期初庫存是否來自盤點實績
    pub resynced: bool,
}

impl StorageDayResult {
    /// 全為零的單日結果
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            bod: Decimal::ZERO,
            inflow: Decimal::ZERO,
            shipments: Decimal::ZERO,
            consumption: Decimal::ZERO,
            outflow: Decimal::ZERO,
            eod: Decimal::ZERO,
            severity: Severity::Normal,
            reason: None,
            resynced: false,
        }
    }

    /// 檢查物料守恆
    pub fn is_balanced(&self) -> bool {
        self.eod == self.bod + self.inflow - self.outflow
            && self.outflow == self.shipments + self.consumption
    }
}
