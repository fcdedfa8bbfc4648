//! 計劃主計算器

use chrono::NaiveDate;
use plan_core::{
    CampaignStatus, DateSpine, Equipment, IdleCause, PlanError, PlanScope, PlannerConfig,
    PlanningInput, Severity, Storage, StorageDayResult,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::actuals::ActualsLedger;
use crate::alert::AlertClassifier;
use crate::balance::{BalanceSimulator, DailyFlows};
use crate::campaign::CampaignSchedule;
use crate::production::{EquipmentTimeline, ProductionEngine};
use crate::recipe::RecipeResolver;
use crate::summary::AlertSummary;
use crate::{PlanResult, PlanWarning, WarningKind};

/// 計劃計算器
///
/// 無狀態：每次呼叫都由輸入快照重新計算完整期間。
pub struct PlanCalculator {
    config: PlannerConfig,
    classifier: AlertClassifier,
}

impl PlanCalculator {
    /// 創建新的計劃計算器
    pub fn new(config: PlannerConfig) -> Self {
        let classifier = AlertClassifier::new(config.high_water_ratio);
        Self { config, classifier }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// 以起始日與天數計算
    ///
    /// 天數非正時回傳 `MalformedRange`，不產生任何部分結果。
    pub fn calculate_range<I, S>(
        &self,
        input: &PlanningInput,
        facility_ids: I,
        start: NaiveDate,
        day_count: i64,
    ) -> plan_core::Result<PlanResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let day_count = u32::try_from(day_count).map_err(|_| {
            PlanError::MalformedRange(format!("天數必須為正整數: {}", day_count))
        })?;
        let spine = DateSpine::new(start, day_count)?;

        let scope = facility_ids
            .into_iter()
            .fold(PlanScope::all_facilities(spine), |scope, id| {
                scope.with_facility(id)
            });

        self.calculate(input, &scope)
    }

    /// 主計算入口
    pub fn calculate(
        &self,
        input: &PlanningInput,
        scope: &PlanScope,
    ) -> plan_core::Result<PlanResult> {
        tracing::info!(
            "開始計劃計算：儲倉 {} 個，設備 {} 台，排程區塊 {} 個，實績 {} 筆，期間 {} ~ {}",
            input.storages.len(),
            input.equipment.len(),
            input.campaigns.len(),
            input.actuals.len(),
            scope.spine.start(),
            scope.spine.end()
        );

        let start_time = std::time::Instant::now();
        let mut warnings = BTreeSet::new();

        // Step 1: 排程區塊 → 區間表
        tracing::debug!("Step 1: 解析排程區塊");
        let schedule = self.build_schedule(input, &mut warnings);

        // Step 2: 實績彙總
        tracing::debug!("Step 2: 實績彙總");
        let ledger = ActualsLedger::build(input, scope);
        warnings.extend(ledger.warnings().iter().cloned());

        // Step 3: 配方檢查
        tracing::debug!("Step 3: 配方解析");
        let resolver = RecipeResolver::new(&input.recipes, &input.materials);
        for product_id in resolver.products() {
            if let Some(recipe) = resolver.resolve(product_id, None).recipe() {
                warnings.extend(recipe.warning(self.config.recipe_tolerance));
            }
        }

        // Step 4: 設備生產
        tracing::debug!("Step 4: 設備生產計算");
        let equipment: Vec<&Equipment> = input
            .equipment
            .iter()
            .filter(|e| scope.includes_facility(&e.facility_id))
            .collect();
        let engine = ProductionEngine::new(input, scope, &schedule, &ledger);
        let mut timelines = engine.run(&equipment, self.config.parallel);
        for timeline in &mut timelines {
            warnings.extend(timeline.warnings.drain(..));
        }
        tracing::debug!("設備數量: {}", timelines.len());

        // Step 5: 入庫與耗用彙總
        tracing::debug!("Step 5: 入庫與耗用彙總");
        let facility_of: HashMap<&str, &str> = equipment
            .iter()
            .map(|e| (e.id.as_str(), e.facility_id.as_str()))
            .collect();
        let flows =
            DailyFlows::from_production(&timelines, &facility_of, &resolver, scope.spine.len());

        // Step 6: 物料平衡
        tracing::debug!("Step 6: 物料平衡模擬");
        let storages: Vec<&Storage> = input
            .storages
            .iter()
            .filter(|s| scope.includes_facility(&s.facility_id))
            .collect();
        let simulator = BalanceSimulator::new(scope.spine, &ledger, &flows, self.classifier)
            .with_inactive_classification(self.config.include_inactive_storages_in_alerts);
        let storage_results: BTreeMap<String, Vec<StorageDayResult>> = simulator
            .run(&storages, self.config.parallel)
            .into_iter()
            .collect();
        tracing::debug!("儲倉數量: {}", storage_results.len());

        // Step 7: 閒置原因
        tracing::debug!("Step 7: 標記閒置原因");
        annotate_idle_causes(&engine, &equipment, &mut timelines, &storages, &storage_results);

        // Step 8: 警示摘要
        tracing::debug!("Step 8: 警示摘要");
        let alerts = AlertSummary::collect(
            storages
                .iter()
                .filter_map(|s| {
                    storage_results
                        .get(&s.id)
                        .map(|days| (*s, days.as_slice()))
                }),
        );

        let result = PlanResult {
            dates: scope.spine.dates().collect(),
            storages: storage_results,
            equipment: timelines
                .into_iter()
                .map(|t| (t.equipment_id, t.days))
                .collect(),
            alerts,
            warnings,
        };

        tracing::info!("計劃計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "警示 {} 筆（缺貨 {}），警告 {} 筆",
            result.alerts.len(),
            result.alerts.count(Severity::Stockout),
            result.warnings.len()
        );

        Ok(result)
    }

    /// 建立排程區間表，無效或引用不存在設備的區塊略過並記錄警告
    fn build_schedule(
        &self,
        input: &PlanningInput,
        warnings: &mut BTreeSet<PlanWarning>,
    ) -> CampaignSchedule {
        let known: HashSet<&str> = input.equipment.iter().map(|e| e.id.as_str()).collect();
        let mut schedule = CampaignSchedule::new();

        for block in &input.campaigns {
            if !known.contains(block.equipment_id.as_str()) {
                tracing::warn!("排程區塊 {} 引用了不存在的設備 {}", block.id, block.equipment_id);
                warnings.insert(PlanWarning::warning(
                    WarningKind::ConfigurationGap,
                    block.equipment_id.clone(),
                    "排程區塊引用了不存在的設備，已略過".to_string(),
                ));
                continue;
            }

            if let Err(err) = schedule.apply(block) {
                tracing::warn!("{}", err);
                warnings.insert(PlanWarning::error(
                    WarningKind::InvalidCampaign,
                    block.id.to_string(),
                    err.to_string(),
                ));
            }
        }

        for capability in &input.capabilities {
            if !known.contains(capability.equipment_id.as_str()) {
                warnings.insert(PlanWarning::info(
                    WarningKind::ConfigurationGap,
                    capability.equipment_id.clone(),
                    "產能記錄引用了不存在的設備".to_string(),
                ));
            }
        }

        schedule
    }
}

impl Default for PlanCalculator {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

/// 閒置日若有可生產產品在同廠儲倉缺貨，標記為缺貨閒置（僅供顯示）
fn annotate_idle_causes(
    engine: &ProductionEngine<'_>,
    equipment: &[&Equipment],
    timelines: &mut [EquipmentTimeline],
    storages: &[&Storage],
    results: &BTreeMap<String, Vec<StorageDayResult>>,
) {
    for (eq, timeline) in equipment.iter().zip(timelines.iter_mut()) {
        let mut linked: Vec<(&str, &[StorageDayResult])> = Vec::new();
        for product_id in engine.capable_products(&eq.id) {
            for storage in storages {
                if storage.facility_id != eq.facility_id || !storage.allows(product_id) {
                    continue;
                }
                if let Some(days) = results.get(&storage.id) {
                    linked.push((product_id, days.as_slice()));
                }
            }
        }
        if linked.is_empty() {
            continue;
        }

        for (index, day) in timeline.days.iter_mut().enumerate() {
            if day.status != CampaignStatus::Idle || day.configuration_error {
                continue;
            }
            let stocked_out = linked.iter().find(|(_, days)| {
                days.get(index)
                    .is_some_and(|d| d.severity == Severity::Stockout)
            });
            if let Some((product_id, _)) = stocked_out {
                day.idle_cause = Some(IdleCause::Stockout {
                    product_id: product_id.to_string(),
                });
            }
        }
    }
}
