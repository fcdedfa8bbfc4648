//! 計算輸入快照與計算範圍

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::actuals::{Actuals, ForecastRecord};
use crate::calendar::DateSpine;
use crate::campaign::CampaignBlock;
use crate::facility::{Capability, Equipment, Material, Storage};
use crate::recipe::Recipe;
use crate::Result;

/// 一次計算所讀取的全部輸入（唯讀快照）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningInput {
    #[serde(default)]
    pub materials: Vec<Material>,

    #[serde(default)]
    pub storages: Vec<Storage>,

    #[serde(default)]
    pub equipment: Vec<Equipment>,

    #[serde(default)]
    pub capabilities: Vec<Capability>,

    /// 排程區塊（依寫入順序，後寫入者優先）
    #[serde(default)]
    pub campaigns: Vec<CampaignBlock>,

    #[serde(default)]
    pub recipes: Vec<Recipe>,

    #[serde(default)]
    pub actuals: Actuals,

    #[serde(default)]
    pub forecasts: Vec<ForecastRecord>,
}

impl PlanningInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入快照
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 快照中出現的所有工廠
    pub fn facility_ids(&self) -> BTreeSet<String> {
        self.storages
            .iter()
            .map(|s| s.facility_id.clone())
            .chain(self.equipment.iter().map(|e| e.facility_id.clone()))
            .collect()
    }

    pub fn material(&self, material_id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == material_id)
    }

    pub fn equipment_by_id(&self, equipment_id: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|e| e.id == equipment_id)
    }

    /// 某設備的所有產能記錄
    pub fn capabilities_for(&self, equipment_id: &str) -> impl Iterator<Item = &Capability> + '_ {
        let equipment_id = equipment_id.to_string();
        self.capabilities
            .iter()
            .filter(move |c| c.equipment_id == equipment_id)
    }
}

/// 計算範圍：工廠集合 + 日期軸
///
/// 每次計算都明確傳入，不依賴任何全域的「目前工廠」狀態。
#[derive(Debug, Clone, Serialize)]
pub struct PlanScope {
    /// 工廠集合（空集合 = 快照中的全部工廠）
    pub facility_ids: BTreeSet<String>,

    pub spine: DateSpine,
}

impl PlanScope {
    /// 涵蓋全部工廠的範圍
    pub fn all_facilities(spine: DateSpine) -> Self {
        Self {
            facility_ids: BTreeSet::new(),
            spine,
        }
    }

    /// 建構器模式：加入工廠
    pub fn with_facility(mut self, facility_id: impl Into<String>) -> Self {
        self.facility_ids.insert(facility_id.into());
        self
    }

    pub fn includes_facility(&self, facility_id: &str) -> bool {
        self.facility_ids.is_empty() || self.facility_ids.contains(facility_id)
    }
}
