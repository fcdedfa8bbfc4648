//! 實績彙總
//!
//! 模擬開始前先將實績與預測依鍵加總（同一鍵的多筆記錄為增量匯入），
//! 並依計算範圍過濾。模擬過程只做查詢。

use chrono::NaiveDate;
use plan_core::{PlanScope, PlanningInput};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{PlanWarning, WarningKind};

/// 工廠 → 產品 → 日期 → 數量
type FacilityProductDaily = HashMap<String, HashMap<String, BTreeMap<NaiveDate, Decimal>>>;

/// 實績帳本
#[derive(Debug, Default)]
pub struct ActualsLedger {
    /// 設備 → 日期 → 產品 → 產量
    production: HashMap<String, BTreeMap<NaiveDate, BTreeMap<String, Decimal>>>,

    shipments: FacilityProductDaily,

    forecasts: FacilityProductDaily,

    /// 儲倉 → 日期 → 期初庫存（各產品加總）
    inventory_bod: HashMap<String, BTreeMap<NaiveDate, Decimal>>,

    /// 引用不存在的設備/儲倉/工廠，或產品沒有儲倉收納
    warnings: Vec<PlanWarning>,
}

impl ActualsLedger {
    /// 彙總計算範圍內的實績與預測
    pub fn build(input: &PlanningInput, scope: &PlanScope) -> Self {
        let mut ledger = Self::default();

        let equipment_facility: HashMap<&str, &str> = input
            .equipment
            .iter()
            .map(|e| (e.id.as_str(), e.facility_id.as_str()))
            .collect();
        let storage_facility: HashMap<&str, &str> = input
            .storages
            .iter()
            .map(|s| (s.id.as_str(), s.facility_id.as_str()))
            .collect();
        let known_facilities: HashSet<&str> = equipment_facility
            .values()
            .chain(storage_facility.values())
            .copied()
            .collect();
        // 工廠 → 有儲倉收納的產品
        let mut stored_products: HashSet<(&str, &str)> = HashSet::new();
        for storage in &input.storages {
            for product_id in &storage.allowed_product_ids {
                stored_products.insert((storage.facility_id.as_str(), product_id.as_str()));
            }
        }

        for actual in &input.actuals.production {
            if !scope.spine.contains(actual.date) {
                continue;
            }
            let Some(facility) = equipment_facility.get(actual.equipment_id.as_str()) else {
                ledger.warnings.push(PlanWarning::warning(
                    WarningKind::ConfigurationGap,
                    actual.equipment_id.clone(),
                    "生產實績引用了不存在的設備，已忽略".to_string(),
                ));
                continue;
            };
            if !scope.includes_facility(facility) {
                continue;
            }
            if !stored_products.contains(&(*facility, actual.product_id.as_str())) {
                ledger.warnings.push(PlanWarning::info(
                    WarningKind::ConfigurationGap,
                    actual.equipment_id.clone(),
                    format!("產品 {} 在工廠 {} 沒有可收納的儲倉，產量不入庫", actual.product_id, facility),
                ));
            }

            *ledger
                .production
                .entry(actual.equipment_id.clone())
                .or_default()
                .entry(actual.date)
                .or_default()
                .entry(actual.product_id.clone())
                .or_insert(Decimal::ZERO) += actual.quantity;
        }

        for actual in &input.actuals.shipments {
            if !scope.spine.contains(actual.date) {
                continue;
            }
            if !known_facilities.contains(actual.facility_id.as_str()) {
                ledger.warnings.push(PlanWarning::info(
                    WarningKind::ConfigurationGap,
                    actual.facility_id.clone(),
                    "出貨實績引用了不存在的工廠，已忽略".to_string(),
                ));
                continue;
            }
            if scope.includes_facility(&actual.facility_id) {
                accumulate(
                    &mut ledger.shipments,
                    &actual.facility_id,
                    &actual.product_id,
                    actual.date,
                    actual.quantity,
                );
            }
        }

        for forecast in &input.forecasts {
            if !scope.spine.contains(forecast.date) {
                continue;
            }
            if !known_facilities.contains(forecast.facility_id.as_str()) {
                ledger.warnings.push(PlanWarning::info(
                    WarningKind::ConfigurationGap,
                    forecast.facility_id.clone(),
                    "出貨預測引用了不存在的工廠，已忽略".to_string(),
                ));
                continue;
            }
            if scope.includes_facility(&forecast.facility_id) {
                accumulate(
                    &mut ledger.forecasts,
                    &forecast.facility_id,
                    &forecast.product_id,
                    forecast.date,
                    forecast.quantity,
                );
            }
        }

        for actual in &input.actuals.inventory_bod {
            if !scope.spine.contains(actual.date) {
                continue;
            }
            let Some(facility) = storage_facility.get(actual.storage_id.as_str()) else {
                ledger.warnings.push(PlanWarning::warning(
                    WarningKind::ConfigurationGap,
                    actual.storage_id.clone(),
                    "庫存實績引用了不存在的儲倉，已忽略".to_string(),
                ));
                continue;
            };
            if !scope.includes_facility(facility) {
                continue;
            }

            *ledger
                .inventory_bod
                .entry(actual.storage_id.clone())
                .or_default()
                .entry(actual.date)
                .or_insert(Decimal::ZERO) += actual.quantity;
        }

        tracing::debug!(
            "實績彙總完成：生產 {} 台設備，出貨 {} 個工廠，盤點 {} 個儲倉",
            ledger.production.len(),
            ledger.shipments.len(),
            ledger.inventory_bod.len()
        );

        ledger
    }

    /// 某設備某天某產品的生產實績
    pub fn production(&self, equipment_id: &str, date: NaiveDate, product_id: &str) -> Option<Decimal> {
        self.production_on(equipment_id, date)?.get(product_id).copied()
    }

    /// 某設備某天所有產品的生產實績
    pub fn production_on(
        &self,
        equipment_id: &str,
        date: NaiveDate,
    ) -> Option<&BTreeMap<String, Decimal>> {
        self.production
            .get(equipment_id)?
            .get(&date)
            .filter(|products| !products.is_empty())
    }

    pub fn shipment_actual(&self, facility_id: &str, product_id: &str, date: NaiveDate) -> Option<Decimal> {
        lookup(&self.shipments, facility_id, product_id, date)
    }

    pub fn forecast(&self, facility_id: &str, product_id: &str, date: NaiveDate) -> Option<Decimal> {
        lookup(&self.forecasts, facility_id, product_id, date)
    }

    /// 出貨量：實績優先，其次預測，都沒有則為 0
    pub fn shipments(&self, facility_id: &str, product_id: &str, date: NaiveDate) -> Decimal {
        self.shipment_actual(facility_id, product_id, date)
            .or_else(|| self.forecast(facility_id, product_id, date))
            .unwrap_or(Decimal::ZERO)
    }

    /// 某儲倉某天的期初庫存實績
    pub fn inventory_bod(&self, storage_id: &str, date: NaiveDate) -> Option<Decimal> {
        self.inventory_bod.get(storage_id)?.get(&date).copied()
    }

    pub fn warnings(&self) -> &[PlanWarning] {
        &self.warnings
    }
}

fn accumulate(
    target: &mut FacilityProductDaily,
    facility_id: &str,
    product_id: &str,
    date: NaiveDate,
    quantity: Decimal,
) {
    *target
        .entry(facility_id.to_string())
        .or_default()
        .entry(product_id.to_string())
        .or_default()
        .entry(date)
        .or_insert(Decimal::ZERO) += quantity;
}

fn lookup(
    source: &FacilityProductDaily,
    facility_id: &str,
    product_id: &str,
    date: NaiveDate,
) -> Option<Decimal> {
    source.get(facility_id)?.get(product_id)?.get(&date).copied()
}
