//! 物料平衡模擬
//!
//! 每個儲倉依日期順序推進：期末 = 期初 + 入庫 - 出貨 - 耗用，
//! 期末作為次日期初，遇到盤點實績時重新對齊。

use plan_core::{DateSpine, Storage, StorageDayResult};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::actuals::ActualsLedger;
use crate::alert::AlertClassifier;
use crate::production::EquipmentTimeline;
use crate::recipe::{RecipeResolution, RecipeResolver};

/// 工廠 → 物料 → 每日數量（索引對齊日期軸）
type FlowMap = HashMap<String, HashMap<String, Vec<Decimal>>>;

/// 每日入庫與耗用（依工廠、物料彙總）
#[derive(Debug, Default)]
pub struct DailyFlows {
    day_count: usize,
    inflow: FlowMap,
    consumption: FlowMap,
}

impl DailyFlows {
    pub fn new(day_count: usize) -> Self {
        Self {
            day_count,
            ..Self::default()
        }
    }

    /// 由設備產出彙總入庫與配方耗用
    ///
    /// `facility_of` 為設備 → 工廠；配方一律使用最新版本。
    pub fn from_production(
        timelines: &[EquipmentTimeline],
        facility_of: &HashMap<&str, &str>,
        resolver: &RecipeResolver<'_>,
        day_count: usize,
    ) -> Self {
        let mut flows = Self::new(day_count);
        let mut recipes: HashMap<String, RecipeResolution> = HashMap::new();

        for timeline in timelines {
            let Some(facility) = facility_of.get(timeline.equipment_id.as_str()) else {
                continue;
            };

            for (index, day) in timeline.days.iter().enumerate() {
                for output in &day.outputs {
                    if output.quantity.is_zero() {
                        continue;
                    }
                    flows.add_inflow(facility, &output.product_id, index, output.quantity);

                    let resolution = recipes
                        .entry(output.product_id.clone())
                        .or_insert_with(|| resolver.resolve(&output.product_id, None));
                    let Some(recipe) = resolution.recipe() else {
                        continue;
                    };

                    for component in &recipe.components {
                        // 產品不會耗用自己
                        if component.material_id == output.product_id {
                            continue;
                        }
                        let used = output.quantity * component.percentage / Decimal::ONE_HUNDRED;
                        flows.add_consumption(facility, &component.material_id, index, used);
                    }
                }
            }
        }

        flows
    }

    pub fn add_inflow(&mut self, facility_id: &str, product_id: &str, index: usize, quantity: Decimal) {
        let day_count = self.day_count;
        add(&mut self.inflow, day_count, facility_id, product_id, index, quantity);
    }

    pub fn add_consumption(
        &mut self,
        facility_id: &str,
        material_id: &str,
        index: usize,
        quantity: Decimal,
    ) {
        let day_count = self.day_count;
        add(&mut self.consumption, day_count, facility_id, material_id, index, quantity);
    }

    pub fn inflow(&self, facility_id: &str, product_id: &str, index: usize) -> Decimal {
        get(&self.inflow, facility_id, product_id, index)
    }

    pub fn consumption(&self, facility_id: &str, material_id: &str, index: usize) -> Decimal {
        get(&self.consumption, facility_id, material_id, index)
    }
}

fn add(
    map: &mut FlowMap,
    day_count: usize,
    facility_id: &str,
    material_id: &str,
    index: usize,
    quantity: Decimal,
) {
    if index >= day_count {
        return;
    }
    let series = map
        .entry(facility_id.to_string())
        .or_default()
        .entry(material_id.to_string())
        .or_insert_with(|| vec![Decimal::ZERO; day_count]);
    series[index] += quantity;
}

fn get(map: &FlowMap, facility_id: &str, material_id: &str, index: usize) -> Decimal {
    map.get(facility_id)
        .and_then(|by_material| by_material.get(material_id))
        .and_then(|series| series.get(index))
        .copied()
        .unwrap_or(Decimal::ZERO)
}

/// 物料平衡模擬器
pub struct BalanceSimulator<'a> {
    spine: DateSpine,
    ledger: &'a ActualsLedger,
    flows: &'a DailyFlows,
    classifier: AlertClassifier,

    /// 未設定產品的儲倉是否依門檻分類（否則一律為正常）
    classify_inactive: bool,
}

impl<'a> BalanceSimulator<'a> {
    pub fn new(
        spine: DateSpine,
        ledger: &'a ActualsLedger,
        flows: &'a DailyFlows,
        classifier: AlertClassifier,
    ) -> Self {
        Self {
            spine,
            ledger,
            flows,
            classifier,
            classify_inactive: false,
        }
    }

    pub fn with_inactive_classification(mut self, classify: bool) -> Self {
        self.classify_inactive = classify;
        self
    }

    /// 模擬所有儲倉（各儲倉互相獨立，可並行）
    pub fn run(&self, storages: &[&Storage], parallel: bool) -> Vec<(String, Vec<StorageDayResult>)> {
        if parallel {
            storages
                .par_iter()
                .map(|storage| (storage.id.clone(), self.simulate(storage)))
                .collect()
        } else {
            storages
                .iter()
                .map(|storage| (storage.id.clone(), self.simulate(storage)))
                .collect()
        }
    }

    /// 模擬單一儲倉的時間序列（必須依日期順序）
    pub fn simulate(&self, storage: &Storage) -> Vec<StorageDayResult> {
        if !storage.is_active() {
            return self
                .spine
                .dates()
                .map(|date| {
                    let mut day = StorageDayResult::empty(date);
                    if self.classify_inactive {
                        let classification = self.classifier.classify(day.eod, storage.max_capacity);
                        day.severity = classification.severity;
                        day.reason = classification.reason;
                    }
                    day
                })
                .collect();
        }

        let facility = storage.facility_id.as_str();
        let mut results = Vec::with_capacity(self.spine.len());
        let mut carried = Decimal::ZERO;

        for (index, date) in self.spine.dates().enumerate() {
            let (bod, resynced) = match self.ledger.inventory_bod(&storage.id, date) {
                Some(actual) => (actual, true),
                None => (carried, false),
            };

            let mut inflow = Decimal::ZERO;
            let mut shipments = Decimal::ZERO;
            let mut consumption = Decimal::ZERO;
            for product_id in &storage.allowed_product_ids {
                inflow += self.flows.inflow(facility, product_id, index);
                shipments += self.ledger.shipments(facility, product_id, date);
                consumption += self.flows.consumption(facility, product_id, index);
            }

            let outflow = shipments + consumption;
            let eod = bod + inflow - outflow;
            let classification = self.classifier.classify(eod, storage.max_capacity);

            results.push(StorageDayResult {
                date,
                bod,
                inflow,
                shipments,
                consumption,
                outflow,
                eod,
                severity: classification.severity,
                reason: classification.reason,
                resynced,
            });

            carried = eod;
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use plan_core::{
        InventoryActual, PlanScope, PlanningInput, Severity, ShipmentActual,
    };

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    fn qty(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn silo() -> Storage {
        Storage::new("SILO-1", "PLANT-A")
            .with_product("CEM-I")
            .with_max_capacity(qty(1000))
    }

    #[test]
    fn test_inventory_chain_with_resync() {
        let spine = DateSpine::new(d(1), 4).unwrap();
        let mut input = PlanningInput::new();
        input.storages.push(silo());
        input.actuals.inventory_bod = vec![
            InventoryActual::new(d(1), "SILO-1", "CEM-I", qty(100)),
            InventoryActual::new(d(3), "SILO-1", "CEM-I", qty(200)),
        ];
        input.actuals.shipments = vec![ShipmentActual::new(d(2), "PLANT-A", "CEM-I", qty(900))];
        let scope = PlanScope::all_facilities(spine);
        let ledger = ActualsLedger::build(&input, &scope);

        let mut flows = DailyFlows::new(spine.len());
        flows.add_inflow("PLANT-A", "CEM-I", 0, qty(50));

        let simulator = BalanceSimulator::new(spine, &ledger, &flows, AlertClassifier::default());
        let days = simulator.simulate(&input.storages[0]);

        assert_eq!(days[0].bod, qty(100));
        assert!(days[0].resynced);
        assert_eq!(days[0].eod, qty(150));
        assert_eq!(days[0].severity, Severity::Normal);

        assert_eq!(days[1].bod, qty(150));
        assert_eq!(days[1].outflow, qty(900));
        assert_eq!(days[1].eod, qty(-750));
        assert_eq!(days[1].severity, Severity::Stockout);

        assert_eq!(days[2].bod, qty(200));
        assert!(days[2].resynced);
        assert_eq!(days[3].bod, days[2].eod);
        assert!(days.iter().all(StorageDayResult::is_balanced));
    }

    #[test]
    fn test_first_day_without_actual_starts_at_zero() {
        let spine = DateSpine::new(d(1), 2).unwrap();
        let ledger = ActualsLedger::default();
        let flows = DailyFlows::new(spine.len());
        let simulator = BalanceSimulator::new(spine, &ledger, &flows, AlertClassifier::default());

        let days = simulator.simulate(&silo());

        assert_eq!(days[0].bod, Decimal::ZERO);
        assert!(!days[0].resynced);
        assert_eq!(days[0].severity, Severity::Stockout);
    }

    #[test]
    fn test_consumption_reduces_input_storage() {
        let spine = DateSpine::new(d(1), 2).unwrap();
        let ledger = ActualsLedger::default();
        let mut flows = DailyFlows::new(spine.len());
        flows.add_consumption("PLANT-A", "GYP", 0, qty(50));
        // 其他工廠的耗用不影響
        flows.add_consumption("PLANT-B", "GYP", 0, qty(999));

        let storage = Storage::new("GYP-BIN", "PLANT-A").with_product("GYP");
        let simulator = BalanceSimulator::new(spine, &ledger, &flows, AlertClassifier::default());
        let days = simulator.simulate(&storage);

        assert_eq!(days[0].consumption, qty(50));
        assert_eq!(days[0].shipments, Decimal::ZERO);
        assert_eq!(days[0].eod, qty(-50));
        assert_eq!(days[1].consumption, Decimal::ZERO);
    }

    #[test]
    fn test_inactive_storage_is_empty() {
        let spine = DateSpine::new(d(1), 3).unwrap();
        let ledger = ActualsLedger::default();
        let mut flows = DailyFlows::new(spine.len());
        flows.add_inflow("PLANT-A", "CEM-I", 0, qty(50));

        let storage = Storage::new("SPARE", "PLANT-A");
        let simulator = BalanceSimulator::new(spine, &ledger, &flows, AlertClassifier::default());
        let days = simulator.simulate(&storage);

        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|day| day.inflow.is_zero() && day.eod.is_zero()));
        assert!(days
            .iter()
            .all(|day| day.severity == Severity::Normal && day.reason.is_none()));

        let classified = BalanceSimulator::new(spine, &ledger, &flows, AlertClassifier::default())
            .with_inactive_classification(true)
            .simulate(&storage);
        assert!(classified.iter().all(|day| day.severity == Severity::Stockout));
    }

    #[test]
    fn test_flows_ignore_out_of_range_index() {
        let mut flows = DailyFlows::new(2);
        flows.add_inflow("PLANT-A", "CLK", 5, qty(10));

        assert_eq!(flows.inflow("PLANT-A", "CLK", 5), Decimal::ZERO);
        assert_eq!(flows.inflow("PLANT-A", "CLK", 0), Decimal::ZERO);
    }
}
