//! 排程產量參考值
//!
//! 以開始日之前的生產實績計算截尾平均，供編輯排程時參考。

use chrono::{Duration, NaiveDate};
use plan_core::{Capability, PlanningInput};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// 回溯天數上限
pub const LOOKBACK_DAYS: i64 = 400;

/// 標準取樣天數
pub const STANDARD_WINDOWS: [usize; 3] = [7, 15, 30];

/// 截尾所需的最少樣本數
const TRIM_MIN_SAMPLES: usize = 5;

/// 參考值來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// 同設備同產品
    Equipment,
    /// 同工廠所有設備
    Facility,
    /// 沒有可用實績
    None,
}

/// 產量參考值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateEstimate {
    pub value: Option<Decimal>,
    pub source: RateSource,
    /// 取樣天數
    pub points: usize,
}

impl RateEstimate {
    fn none() -> Self {
        Self {
            value: None,
            source: RateSource::None,
            points: 0,
        }
    }
}

type DailySeries = BTreeMap<NaiveDate, Decimal>;

/// 產量參考值計算器
pub struct RateHelper<'a> {
    /// 設備 → 產品 → 每日產量
    by_equipment: HashMap<&'a str, HashMap<&'a str, DailySeries>>,

    /// 工廠 → 產品 → 每日產量
    by_facility: HashMap<&'a str, HashMap<&'a str, DailySeries>>,

    equipment_facility: HashMap<&'a str, &'a str>,

    capabilities: &'a [Capability],
}

impl<'a> RateHelper<'a> {
    pub fn new(input: &'a PlanningInput) -> Self {
        let equipment_facility: HashMap<&'a str, &'a str> = input
            .equipment
            .iter()
            .map(|e| (e.id.as_str(), e.facility_id.as_str()))
            .collect();

        let mut by_equipment: HashMap<&'a str, HashMap<&'a str, DailySeries>> = HashMap::new();
        let mut by_facility: HashMap<&'a str, HashMap<&'a str, DailySeries>> = HashMap::new();

        for actual in &input.actuals.production {
            *by_equipment
                .entry(actual.equipment_id.as_str())
                .or_default()
                .entry(actual.product_id.as_str())
                .or_default()
                .entry(actual.date)
                .or_insert(Decimal::ZERO) += actual.quantity;

            if let Some(facility) = equipment_facility.get(actual.equipment_id.as_str()) {
                *by_facility
                    .entry(*facility)
                    .or_default()
                    .entry(actual.product_id.as_str())
                    .or_default()
                    .entry(actual.date)
                    .or_insert(Decimal::ZERO) += actual.quantity;
            }
        }

        Self {
            by_equipment,
            by_facility,
            equipment_facility,
            capabilities: &input.capabilities,
        }
    }

    /// 設備對產品的產能上限
    pub fn capability_rate(&self, equipment_id: &str, product_id: &str) -> Option<Decimal> {
        self.capabilities
            .iter()
            .rev()
            .find(|c| c.equipment_id == equipment_id && c.product_id == product_id)
            .map(|c| c.max_rate)
    }

    /// 取 `start` 之前最多 `window` 個有產量的日子計算截尾平均
    ///
    /// 同設備沒有實績時改用同工廠所有設備的合計。
    pub fn estimate(
        &self,
        equipment_id: &str,
        product_id: &str,
        start: NaiveDate,
        window: usize,
    ) -> RateEstimate {
        if window == 0 {
            return RateEstimate::none();
        }

        let own = self
            .by_equipment
            .get(equipment_id)
            .and_then(|by_product| by_product.get(product_id));
        let samples = collect_samples(own, start, window);
        if !samples.is_empty() {
            return RateEstimate {
                value: trimmed_average(&samples),
                source: RateSource::Equipment,
                points: samples.len(),
            };
        }

        let facility = self
            .equipment_facility
            .get(equipment_id)
            .and_then(|facility| self.by_facility.get(facility))
            .and_then(|by_product| by_product.get(product_id));
        let samples = collect_samples(facility, start, window);
        if !samples.is_empty() {
            return RateEstimate {
                value: trimmed_average(&samples),
                source: RateSource::Facility,
                points: samples.len(),
            };
        }

        RateEstimate::none()
    }

    /// 7/15/30 天的參考值
    pub fn standard_estimates(
        &self,
        equipment_id: &str,
        product_id: &str,
        start: NaiveDate,
    ) -> Vec<(usize, RateEstimate)> {
        STANDARD_WINDOWS
            .iter()
            .map(|&window| (window, self.estimate(equipment_id, product_id, start, window)))
            .collect()
    }
}

fn collect_samples(series: Option<&DailySeries>, start: NaiveDate, window: usize) -> Vec<Decimal> {
    let Some(series) = series else {
        return Vec::new();
    };
    let Some(earliest) = start.checked_sub_signed(Duration::days(LOOKBACK_DAYS)) else {
        return Vec::new();
    };

    series
        .range(earliest..start)
        .rev()
        .map(|(_, qty)| *qty)
        .filter(|qty| *qty > Decimal::ZERO)
        .take(window)
        .collect()
}

/// 截尾平均：樣本數 ≥ 5 時去掉一個最小值與一個最大值
pub fn trimmed_average(values: &[Decimal]) -> Option<Decimal> {
    let mut samples: Vec<Decimal> = values
        .iter()
        .copied()
        .filter(|v| *v > Decimal::ZERO)
        .collect();

    if samples.len() >= TRIM_MIN_SAMPLES {
        if let Some(pos) = samples.iter().enumerate().min_by_key(|(_, v)| **v).map(|(i, _)| i) {
            samples.remove(pos);
        }
        if let Some(pos) = samples.iter().enumerate().max_by_key(|(_, v)| **v).map(|(i, _)| i) {
            samples.remove(pos);
        }
    }

    if samples.is_empty() {
        return None;
    }

    let total: Decimal = samples.iter().sum();
    Some(total / Decimal::from(samples.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::{Equipment, EquipmentType, ProductionActual};
    use rstest::rstest;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    fn qty(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn input() -> PlanningInput {
        let mut input = PlanningInput::new();
        input.equipment = vec![
            Equipment::new("FM-1", "PLANT-A", EquipmentType::FinishMill),
            Equipment::new("FM-2", "PLANT-A", EquipmentType::FinishMill),
        ];
        input.capabilities = vec![Capability::new("FM-1", "CEM-I", qty(1800))];
        input
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&[100, 200], Some(150))]
    #[case(&[100, 0, 200], Some(150))]
    #[case(&[10, 100, 100, 100, 1000], Some(100))]
    #[case(&[50, 50, 50, 50, 50], Some(50))]
    fn test_trimmed_average(#[case] values: &[i64], #[case] expected: Option<i64>) {
        let values: Vec<Decimal> = values.iter().map(|v| qty(*v)).collect();
        assert_eq!(trimmed_average(&values), expected.map(qty));
    }

    #[test]
    fn test_equipment_samples_before_start() {
        let mut input = input();
        input.actuals.production = (1..=10)
            .map(|day| ProductionActual::new(d(day), "FM-1", "CEM-I", qty(1000 + day as i64)))
            .collect();
        let helper = RateHelper::new(&input);

        let estimate = helper.estimate("FM-1", "CEM-I", d(8), 3);

        // 7、6、5 號
        assert_eq!(estimate.points, 3);
        assert_eq!(estimate.source, RateSource::Equipment);
        assert_eq!(estimate.value, Some(qty(1006)));
    }

    #[test]
    fn test_falls_back_to_facility() {
        let mut input = input();
        input.actuals.production = vec![
            ProductionActual::new(d(1), "FM-2", "CEM-I", qty(900)),
            ProductionActual::new(d(2), "FM-2", "CEM-I", qty(1100)),
        ];
        let helper = RateHelper::new(&input);

        let estimate = helper.estimate("FM-1", "CEM-I", d(10), 7);

        assert_eq!(estimate.source, RateSource::Facility);
        assert_eq!(estimate.value, Some(qty(1000)));
        assert_eq!(estimate.points, 2);
    }

    #[test]
    fn test_no_history() {
        let helper_input = input();
        let helper = RateHelper::new(&helper_input);

        let estimates = helper.standard_estimates("FM-1", "CEM-I", d(10));

        assert_eq!(estimates.len(), 3);
        assert!(estimates
            .iter()
            .all(|(_, e)| e.source == RateSource::None && e.value.is_none()));
        assert_eq!(helper.capability_rate("FM-1", "CEM-I"), Some(qty(1800)));
        assert_eq!(helper.capability_rate("FM-2", "CEM-I"), None);
    }

    #[test]
    fn test_lookback_limit() {
        let mut input = input();
        let old = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        input.actuals.production = vec![ProductionActual::new(old, "FM-1", "CEM-I", qty(500))];
        let helper = RateHelper::new(&input);

        assert_eq!(helper.estimate("FM-1", "CEM-I", d(10), 7).source, RateSource::None);
    }
}
