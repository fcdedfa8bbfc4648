//! 設備生產計算
//!
//! 每台設備每天：排程 → 產能截斷 → 實績覆蓋。

use chrono::NaiveDate;
use plan_core::{
    CampaignStatus, Capability, Constraint, Equipment, EquipmentDayResult, PlanScope,
    PlanningInput, ProductOutput, QuantitySource,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::actuals::ActualsLedger;
use crate::campaign::{CampaignSchedule, DayAssignment};
use crate::{PlanWarning, WarningKind};

/// 單台設備的時間序列
pub struct EquipmentTimeline {
    pub equipment_id: String,
    pub days: Vec<EquipmentDayResult>,
    pub warnings: Vec<PlanWarning>,
}

/// 設備生產引擎
pub struct ProductionEngine<'a> {
    scope: &'a PlanScope,
    schedule: &'a CampaignSchedule,
    ledger: &'a ActualsLedger,

    /// 設備 → 產品 → 產能
    capabilities: HashMap<&'a str, HashMap<&'a str, &'a Capability>>,
}

impl<'a> ProductionEngine<'a> {
    /// 創建新的生產引擎
    pub fn new(
        input: &'a PlanningInput,
        scope: &'a PlanScope,
        schedule: &'a CampaignSchedule,
        ledger: &'a ActualsLedger,
    ) -> Self {
        let mut capabilities: HashMap<&'a str, HashMap<&'a str, &'a Capability>> = HashMap::new();
        for capability in &input.capabilities {
            // 同一 (設備, 產品) 重複定義時以最後一筆為準
            capabilities
                .entry(capability.equipment_id.as_str())
                .or_default()
                .insert(capability.product_id.as_str(), capability);
        }

        Self {
            scope,
            schedule,
            ledger,
            capabilities,
        }
    }

    /// 設備對某產品的產能
    pub fn capability(&self, equipment_id: &str, product_id: &str) -> Option<&'a Capability> {
        self.capabilities
            .get(equipment_id)?
            .get(product_id)
            .copied()
    }

    /// 設備可生產的產品（排序）
    pub fn capable_products(&self, equipment_id: &str) -> Vec<&'a str> {
        let mut products: Vec<&'a str> = self
            .capabilities
            .get(equipment_id)
            .map(|by_product| by_product.keys().copied().collect())
            .unwrap_or_default();
        products.sort_unstable();
        products
    }

    /// 計算所有設備的時間序列
    pub fn run(&self, equipment: &[&Equipment], parallel: bool) -> Vec<EquipmentTimeline> {
        if parallel {
            equipment
                .par_iter()
                .map(|eq| self.timeline(eq))
                .collect()
        } else {
            equipment.iter().map(|eq| self.timeline(eq)).collect()
        }
    }

    /// 計算單台設備的時間序列
    pub fn timeline(&self, equipment: &Equipment) -> EquipmentTimeline {
        let mut warnings = Vec::new();
        let days = self
            .scope
            .spine
            .dates()
            .map(|date| {
                let (day, warning) = self.resolve_day(&equipment.id, date);
                warnings.extend(warning);
                day
            })
            .collect();

        EquipmentTimeline {
            equipment_id: equipment.id.clone(),
            days,
            warnings,
        }
    }

    /// 計算單日結果
    pub fn resolve_day(
        &self,
        equipment_id: &str,
        date: NaiveDate,
    ) -> (EquipmentDayResult, Option<PlanWarning>) {
        let assignment = self.schedule.resolve(equipment_id, date);

        // 實績優先，不論排程狀態
        if let Some(actuals) = self.ledger.production_on(equipment_id, date) {
            return (actual_day(date, &assignment, actuals), None);
        }

        if assignment.status != CampaignStatus::Produce {
            return (EquipmentDayResult::stopped(date, assignment.status), None);
        }

        let Some(product_id) = assignment.product_id else {
            return (EquipmentDayResult::stopped(date, CampaignStatus::Idle), None);
        };

        let Some(capability) = self.capability(equipment_id, &product_id) else {
            let mut day = EquipmentDayResult::stopped(date, CampaignStatus::Idle);
            day.configuration_error = true;
            let warning = PlanWarning::warning(
                WarningKind::ConfigurationGap,
                format!("{}/{}", equipment_id, product_id),
                format!("設備 {} 沒有產品 {} 的產能，排程以閒置處理", equipment_id, product_id),
            );
            return (day, Some(warning));
        };

        let day = match assignment.rate {
            Some(rate) if rate > capability.max_rate => {
                EquipmentDayResult::planned(date, product_id, capability.max_rate).with_constraint(
                    Constraint::capped(format!(
                        "排程產量 {} 超過產能上限 {}",
                        rate, capability.max_rate
                    )),
                )
            }
            Some(rate) => EquipmentDayResult::planned(date, product_id, rate),
            None => EquipmentDayResult::planned(date, product_id, capability.max_rate),
        };

        (day, None)
    }
}

/// 以實績建立單日結果
fn actual_day(
    date: NaiveDate,
    assignment: &DayAssignment,
    actuals: &BTreeMap<String, Decimal>,
) -> EquipmentDayResult {
    let product_id = assignment
        .product_id
        .as_ref()
        .filter(|p| actuals.contains_key(p.as_str()))
        .or_else(|| actuals.keys().next())
        .cloned();

    let outputs: Vec<ProductOutput> = actuals
        .iter()
        .map(|(product_id, quantity)| ProductOutput {
            product_id: product_id.clone(),
            quantity: *quantity,
        })
        .collect();

    EquipmentDayResult {
        date,
        status: CampaignStatus::Produce,
        product_id,
        quantity: outputs.iter().map(|o| o.quantity).sum(),
        source: QuantitySource::Actual,
        constraint: None,
        configuration_error: false,
        idle_cause: None,
        outputs,
    }
}
