//! 物料平衡性質測試

use chrono::{Duration, NaiveDate};
use plan_calc::PlanCalculator;
use plan_core::{
    CampaignBlock, Capability, DateSpine, Equipment, EquipmentType, InventoryActual, Material,
    MaterialCategory, PlanScope, PlannerConfig, PlanningInput, Recipe, Severity, ShipmentActual,
    Storage, StorageDayResult,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// 單日輸入：窯產量、水泥磨產量、出貨實績、熟料盤點
#[derive(Debug, Clone)]
struct DayPlan {
    kiln_rate: i64,
    mill_rate: i64,
    shipment: Option<i64>,
    clinker_count: Option<i64>,
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn qty(v: i64) -> Decimal {
    Decimal::from(v)
}

fn day_plan() -> impl Strategy<Value = DayPlan> {
    (
        0i64..3000,
        0i64..2000,
        prop::option::of(0i64..2500),
        prop::option::weighted(0.1, -500i64..30_000),
    )
        .prop_map(|(kiln_rate, mill_rate, shipment, clinker_count)| DayPlan {
            kiln_rate,
            mill_rate,
            shipment,
            clinker_count,
        })
}

fn build_input(days: &[DayPlan]) -> PlanningInput {
    let mut input = PlanningInput::new();
    input.materials = vec![
        Material::new("CLK", "Clinker", MaterialCategory::Intermediate),
        Material::new("GYP", "Gypsum", MaterialCategory::Raw),
        Material::new("CEM-I", "Cement I", MaterialCategory::Finished),
    ];
    input.storages = vec![
        Storage::new("CLK-YARD", "PLANT-A")
            .with_product("CLK")
            .with_max_capacity(qty(20_000)),
        Storage::new("GYP-BIN", "PLANT-A").with_product("GYP"),
        Storage::new("SILO-1", "PLANT-A")
            .with_product("CEM-I")
            .with_max_capacity(qty(5_000)),
        Storage::new("SPARE", "PLANT-A").with_max_capacity(qty(100)),
    ];
    input.equipment = vec![
        Equipment::new("KILN-1", "PLANT-A", EquipmentType::Kiln),
        Equipment::new("FM-1", "PLANT-A", EquipmentType::FinishMill),
    ];
    input.capabilities = vec![
        Capability::new("KILN-1", "CLK", qty(2000)),
        Capability::new("FM-1", "CEM-I", qty(1500)),
    ];
    input.recipes = vec![Recipe::new("CEM-I")
        .with_component("CLK", Decimal::ZERO)
        .with_component("GYP", qty(5))];

    for (i, plan) in days.iter().enumerate() {
        let date = start() + Duration::days(i as i64);
        input.campaigns.push(CampaignBlock::produce(
            "KILN-1",
            "CLK",
            date,
            date,
            qty(plan.kiln_rate),
        ));
        input.campaigns.push(CampaignBlock::produce(
            "FM-1",
            "CEM-I",
            date,
            date,
            qty(plan.mill_rate),
        ));
        if let Some(shipment) = plan.shipment {
            input
                .actuals
                .shipments
                .push(ShipmentActual::new(date, "PLANT-A", "CEM-I", qty(shipment)));
        }
        if let Some(count) = plan.clinker_count {
            input
                .actuals
                .inventory_bod
                .push(InventoryActual::new(date, "CLK-YARD", "CLK", qty(count)));
        }
    }

    input
}

fn expected_severity(day: &StorageDayResult, storage: &Storage) -> Severity {
    if !storage.is_active() {
        return Severity::Normal;
    }
    if day.eod <= Decimal::ZERO {
        return Severity::Stockout;
    }
    match storage.max_capacity {
        Some(capacity) if day.eod > capacity => Severity::Full,
        Some(capacity) if day.eod > capacity * Decimal::new(75, 2) => Severity::NearCapacity,
        _ => Severity::Normal,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_conservation_chaining_and_resync(days in prop::collection::vec(day_plan(), 1..40)) {
        let input = build_input(&days);
        let scope = PlanScope::all_facilities(DateSpine::new(start(), days.len() as u32).unwrap());
        let result = PlanCalculator::new(PlannerConfig::default())
            .calculate(&input, &scope)
            .unwrap();

        for storage in &input.storages {
            let series = &result.storages[&storage.id];
            prop_assert_eq!(series.len(), days.len());

            for (i, day) in series.iter().enumerate() {
                prop_assert!(day.is_balanced(), "{} {} 不守恆", storage.id, day.date);
                prop_assert_eq!(day.severity, expected_severity(day, storage));

                if i > 0 && !day.resynced {
                    prop_assert_eq!(day.bod, series[i - 1].eod);
                }
            }
        }

        let clinker = &result.storages["CLK-YARD"];
        for (i, plan) in days.iter().enumerate() {
            match plan.clinker_count {
                Some(count) => {
                    prop_assert!(clinker[i].resynced);
                    prop_assert_eq!(clinker[i].bod, qty(count));
                }
                None => prop_assert!(!clinker[i].resynced),
            }
        }
    }

    #[test]
    fn prop_planned_quantity_never_exceeds_capability(days in prop::collection::vec(day_plan(), 1..30)) {
        let input = build_input(&days);
        let scope = PlanScope::all_facilities(DateSpine::new(start(), days.len() as u32).unwrap());
        let result = PlanCalculator::new(PlannerConfig::default().with_parallel(false))
            .calculate(&input, &scope)
            .unwrap();

        for (i, plan) in days.iter().enumerate() {
            let kiln = &result.equipment["KILN-1"][i];
            prop_assert_eq!(kiln.quantity, qty(plan.kiln_rate.min(2000)));
            prop_assert_eq!(kiln.is_capped(), plan.kiln_rate > 2000);

            let mill = &result.equipment["FM-1"][i];
            prop_assert_eq!(mill.quantity, qty(plan.mill_rate.min(1500)));
        }
    }

    #[test]
    fn prop_alert_summary_lists_every_non_normal_cell(days in prop::collection::vec(day_plan(), 1..30)) {
        let input = build_input(&days);
        let scope = PlanScope::all_facilities(DateSpine::new(start(), days.len() as u32).unwrap());
        let result = PlanCalculator::default().calculate(&input, &scope).unwrap();

        let non_normal: usize = result
            .storages
            .values()
            .flat_map(|series| series.iter())
            .filter(|day| day.severity.is_alert())
            .count();

        prop_assert_eq!(result.alerts.len(), non_normal);
        prop_assert!(result.storages["SPARE"].iter().all(|day| day.severity == Severity::Normal));
        let grouped_days: u32 = result.alerts.grouped().iter().map(|r| r.days).sum();
        prop_assert_eq!(grouped_days as usize, non_normal);
    }
}
