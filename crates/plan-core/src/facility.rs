//! 工廠配置模型：物料、儲倉、設備、產能

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 物料類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    /// 原料
    Raw,
    /// 燃料
    Fuel,
    /// 中間品（熟料）
    Intermediate,
    /// 成品（水泥）
    Finished,
}

/// 物料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// 物料ID
    pub id: String,

    /// 名稱
    pub name: String,

    /// 類別
    pub category: MaterialCategory,
}

impl Material {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: MaterialCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
        }
    }

    /// 是否為配方中自動補足比例的物料
    pub fn is_auto_component(&self) -> bool {
        self.category == MaterialCategory::Intermediate
    }
}

/// 儲倉（筒倉、料場）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    /// 儲倉ID
    pub id: String,

    /// 所屬工廠
    pub facility_id: String,

    /// 名稱
    #[serde(default)]
    pub name: String,

    /// 允許存放的物料
    #[serde(default)]
    pub allowed_product_ids: BTreeSet<String>,

    /// 最大容量（未設定 = 無上限）
    #[serde(default)]
    pub max_capacity: Option<Decimal>,
}

impl Storage {
    /// 創建新的儲倉
    pub fn new(id: impl Into<String>, facility_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            facility_id: facility_id.into(),
            allowed_product_ids: BTreeSet::new(),
            max_capacity: None,
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 建構器模式：允許存放某物料
    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.allowed_product_ids.insert(product_id.into());
        self
    }

    /// 建構器模式：設置最大容量
    pub fn with_max_capacity(mut self, capacity: Decimal) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    pub fn allows(&self, product_id: &str) -> bool {
        self.allowed_product_ids.contains(product_id)
    }

    /// 沒有任何允許物料的儲倉永遠為空
    pub fn is_active(&self) -> bool {
        !self.allowed_product_ids.is_empty()
    }
}

/// 設備類型
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    /// 窯
    Kiln,
    /// 水泥磨
    FinishMill,
    /// 生料磨
    RawMill,
    /// 其他類型
    Other(String),
}

/// 生產設備
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    /// 設備ID
    pub id: String,

    /// 所屬工廠
    pub facility_id: String,

    /// 名稱
    #[serde(default)]
    pub name: String,

    /// 設備類型
    pub equipment_type: EquipmentType,
}

impl Equipment {
    /// 創建新的設備
    pub fn new(
        id: impl Into<String>,
        facility_id: impl Into<String>,
        equipment_type: EquipmentType,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            facility_id: facility_id.into(),
            equipment_type,
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// 設備產能：(設備, 產品) → 最大日產量
///
/// 設備只能排產有產能記錄的產品，沒有隱含的預設產量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub equipment_id: String,

    pub product_id: String,

    /// 最大日產量
    pub max_rate: Decimal,

    /// 單位能耗係數
    #[serde(default)]
    pub energy_factor: Option<Decimal>,
}

impl Capability {
    pub fn new(
        equipment_id: impl Into<String>,
        product_id: impl Into<String>,
        max_rate: Decimal,
    ) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            product_id: product_id.into(),
            max_rate,
            energy_factor: None,
        }
    }

    /// 建構器模式：設置能耗係數
    pub fn with_energy_factor(mut self, factor: Decimal) -> Self {
        self.energy_factor = Some(factor);
        self
    }
}
