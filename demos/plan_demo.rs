//! 水泥廠計劃計算示例
//!
//! 執行：`RUST_LOG=plan_calc=debug cargo run --example plan_demo`

use anyhow::Context;
use cement_plan::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    logging::init();

    println!("=== 水泥廠計劃計算示例 ===\n");

    let start = NaiveDate::from_ymd_opt(2025, 11, 1).context("無效的起始日")?;
    let end = NaiveDate::from_ymd_opt(2025, 11, 30).context("無效的結束日")?;

    let mut input = PlanningInput::new();
    input.materials = vec![
        Material::new("CLK", "Clinker", MaterialCategory::Intermediate),
        Material::new("GYP", "Gypsum", MaterialCategory::Raw),
        Material::new("CEM-I", "Cement Type I", MaterialCategory::Finished),
    ];
    input.storages = vec![
        Storage::new("CLK-YARD", "PLANT-A")
            .with_name("Clinker Yard")
            .with_product("CLK")
            .with_max_capacity(Decimal::from(60_000)),
        Storage::new("GYP-BIN", "PLANT-A")
            .with_name("Gypsum Bin")
            .with_product("GYP")
            .with_max_capacity(Decimal::from(3_000)),
        Storage::new("SILO-1", "PLANT-A")
            .with_name("Cement Silo 1")
            .with_product("CEM-I")
            .with_max_capacity(Decimal::from(12_000)),
    ];
    input.equipment = vec![
        Equipment::new("KILN-1", "PLANT-A", EquipmentType::Kiln),
        Equipment::new("FM-1", "PLANT-A", EquipmentType::FinishMill),
    ];
    input.capabilities = vec![
        Capability::new("KILN-1", "CLK", Decimal::from(2_400)),
        Capability::new("FM-1", "CEM-I", Decimal::from(1_800)),
    ];
    input.recipes = vec![Recipe::new("CEM-I")
        .with_component("CLK", Decimal::ZERO)
        .with_component("GYP", Decimal::from(5))];

    let maintenance_start = NaiveDate::from_ymd_opt(2025, 11, 10).context("無效日期")?;
    let maintenance_end = NaiveDate::from_ymd_opt(2025, 11, 16).context("無效日期")?;
    input.campaigns = vec![
        CampaignBlock::produce("KILN-1", "CLK", start, end, Decimal::from(2_600)),
        CampaignBlock::downtime(
            "KILN-1",
            CampaignStatus::Maintenance,
            maintenance_start,
            maintenance_end,
        ),
        CampaignBlock::produce("FM-1", "CEM-I", start, end, Decimal::from(1_700)),
    ];
    input.actuals.inventory_bod = vec![
        InventoryActual::new(start, "CLK-YARD", "CLK", Decimal::from(25_000)),
        InventoryActual::new(start, "GYP-BIN", "GYP", Decimal::from(1_500)),
        InventoryActual::new(start, "SILO-1", "CEM-I", Decimal::from(6_000)),
    ];

    // 以固定值產生出貨預測
    let generator = ForecastGenerator::new(&input, ShippingCalendar::new());
    input.forecasts = generator.generate(
        "PLANT-A",
        "CEM-I",
        start,
        &ForecastMethod::Fixed {
            daily: Decimal::from(1_900),
            horizon: ForecastHorizon::EndOfMonth,
        },
    );
    println!("出貨預測: {} 天", input.forecasts.len());

    let scope = PlanScope::all_facilities(DateSpine::from_range(start, end)?);
    let result = PlanCalculator::new(PlannerConfig::default()).calculate(&input, &scope)?;

    println!("\n儲倉期末庫存:");
    for (storage_id, days) in &result.storages {
        if let Some(last) = days.last() {
            println!(
                "  - {}: {} ({})",
                storage_id,
                last.eod,
                last.severity.label()
            );
        }
    }

    println!("\n警示區間:");
    for range in result.alerts.grouped() {
        println!(
            "  - {} {} {} ~ {}（{} 天）",
            range.storage_id,
            range.severity.label(),
            range.start,
            range.end,
            range.days
        );
    }

    if !result.warnings.is_empty() {
        println!("\n警告:");
        for warning in &result.warnings {
            println!("  - [{:?}] {}: {}", warning.kind, warning.subject_id, warning.message);
        }
    }

    Ok(())
}
