use cement_plan::*;
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;

/// 多廠、多年期間的測試快照
fn snapshot(plants: usize, start: NaiveDate, days: i64) -> PlanningInput {
    let mut input = PlanningInput::new();
    input.materials = vec![
        Material::new("CLK", "Clinker", MaterialCategory::Intermediate),
        Material::new("GYP", "Gypsum", MaterialCategory::Raw),
        Material::new("CEM-I", "Cement I", MaterialCategory::Finished),
    ];
    input.recipes = vec![Recipe::new("CEM-I")
        .with_component("CLK", Decimal::ZERO)
        .with_component("GYP", Decimal::from(5))];

    for p in 0..plants {
        let plant = format!("PLANT-{}", p);
        for (storage, product) in [("CLK", "CLK"), ("GYP", "GYP"), ("SILO", "CEM-I")] {
            input.storages.push(
                Storage::new(format!("{}-{}", plant, storage), plant.clone())
                    .with_product(product)
                    .with_max_capacity(Decimal::from(50_000)),
            );
        }

        let kiln = format!("{}-KILN", plant);
        let mill = format!("{}-FM", plant);
        input
            .equipment
            .push(Equipment::new(kiln.clone(), plant.clone(), EquipmentType::Kiln));
        input
            .equipment
            .push(Equipment::new(mill.clone(), plant.clone(), EquipmentType::FinishMill));
        input
            .capabilities
            .push(Capability::new(kiln.clone(), "CLK", Decimal::from(2_500)));
        input
            .capabilities
            .push(Capability::new(mill.clone(), "CEM-I", Decimal::from(1_800)));

        // 每 30 天一個區塊，每 90 天維修一週
        let mut offset = 0;
        while offset < days {
            let block_start = start + Duration::days(offset);
            let block_end = start + Duration::days((offset + 29).min(days - 1));
            input.campaigns.push(CampaignBlock::produce(
                kiln.clone(),
                "CLK",
                block_start,
                block_end,
                Decimal::from(2_600),
            ));
            input.campaigns.push(CampaignBlock::produce(
                mill.clone(),
                "CEM-I",
                block_start,
                block_end,
                Decimal::from(1_700),
            ));
            if offset % 90 == 0 {
                input.campaigns.push(CampaignBlock::downtime(
                    kiln.clone(),
                    CampaignStatus::Maintenance,
                    block_start,
                    block_start + Duration::days(6),
                ));
            }
            offset += 30;
        }

        for offset in 0..days {
            input.forecasts.push(ForecastRecord::new(
                start + Duration::days(offset),
                plant.clone(),
                "CEM-I",
                Decimal::from(1_650),
            ));
        }
    }

    input
}

fn bench_simulate(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let mut group = c.benchmark_group("simulate");

    for years in [1, 3] {
        let days = 365 * years;
        let input = snapshot(4, start, days);
        let scope = PlanScope::all_facilities(DateSpine::new(start, days as u32).unwrap());

        for parallel in [false, true] {
            let calculator = PlanCalculator::new(PlannerConfig::default().with_parallel(parallel));
            let id = BenchmarkId::new(if parallel { "parallel" } else { "sequential" }, years);
            group.bench_with_input(id, &input, |b, input| {
                b.iter(|| calculator.calculate(black_box(input), &scope).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_simulate);
criterion_main!(benches);
