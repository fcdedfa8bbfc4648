//! 配方解析

use plan_core::{Material, Recipe};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{PlanWarning, WarningKind};

/// 已解析的配方組成
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedComponent {
    pub material_id: String,
    pub percentage: Decimal,
    /// 是否為自動補足的組成（中間品/熟料）
    pub auto: bool,
}

/// 已解析的配方
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecipe {
    pub product_id: String,
    pub version: u32,
    pub components: Vec<ResolvedComponent>,

    /// 自動補足的物料
    pub auto_material_id: Option<String>,

    /// 手動組成百分比合計
    pub manual_total: Decimal,

    /// 手動組成已超過 100%（自動組成被截為 0）
    pub over_allocated: bool,
}

impl ResolvedRecipe {
    /// 組成百分比總和
    pub fn total(&self) -> Decimal {
        self.components.iter().map(|c| c.percentage).sum()
    }

    /// 總和是否在 100 ± 容許誤差內
    pub fn is_closed(&self, tolerance: Decimal) -> bool {
        (self.total() - Decimal::ONE_HUNDRED).abs() <= tolerance
    }

    /// 某物料的百分比（同一物料出現多次時加總）
    pub fn percentage_of(&self, material_id: &str) -> Option<Decimal> {
        let mut found = None;
        for component in self.components.iter().filter(|c| c.material_id == material_id) {
            *found.get_or_insert(Decimal::ZERO) += component.percentage;
        }
        found
    }

    /// 生產 `produced` 數量時該物料的耗用量
    pub fn consumption_of(&self, material_id: &str, produced: Decimal) -> Decimal {
        self.percentage_of(material_id)
            .map(|pct| produced * pct / Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO)
    }

    /// 配方本身的問題（供顯示，不影響計算）
    pub fn warning(&self, tolerance: Decimal) -> Option<PlanWarning> {
        let subject = format!("{}@v{}", self.product_id, self.version);
        if self.over_allocated {
            return Some(PlanWarning::warning(
                WarningKind::OverAllocatedRecipe,
                subject,
                format!(
                    "手動組成合計 {}% 超過 100%，自動組成已截為 0",
                    self.manual_total
                ),
            ));
        }
        if !self.is_closed(tolerance) {
            return Some(PlanWarning::warning(
                WarningKind::UnbalancedRecipe,
                subject,
                format!("組成合計 {}% 不等於 100%", self.total()),
            ));
        }
        None
    }
}

/// 配方解析結果
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeResolution {
    Resolved(ResolvedRecipe),
    /// 沒有配方：呼叫端應視為不耗用任何物料，而不是錯誤
    NoRecipe,
}

impl RecipeResolution {
    pub fn recipe(&self) -> Option<&ResolvedRecipe> {
        match self {
            RecipeResolution::Resolved(recipe) => Some(recipe),
            RecipeResolution::NoRecipe => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, RecipeResolution::Resolved(_))
    }
}

/// 配方解析器
pub struct RecipeResolver<'a> {
    /// 產品 → 配方（依版本排序，同版本保留寫入順序）
    recipes: BTreeMap<&'a str, Vec<&'a Recipe>>,

    /// 自動補足類別的物料
    auto_materials: BTreeSet<&'a str>,
}

impl<'a> RecipeResolver<'a> {
    /// 創建新的配方解析器
    pub fn new(recipes: &'a [Recipe], materials: &'a [Material]) -> Self {
        let mut by_product: BTreeMap<&'a str, Vec<&'a Recipe>> = BTreeMap::new();
        for recipe in recipes {
            by_product
                .entry(recipe.product_id.as_str())
                .or_default()
                .push(recipe);
        }
        for list in by_product.values_mut() {
            // 穩定排序：同版本時後寫入者在後
            list.sort_by_key(|r| r.version);
        }

        let auto_materials = materials
            .iter()
            .filter(|m| m.is_auto_component())
            .map(|m| m.id.as_str())
            .collect();

        Self {
            recipes: by_product,
            auto_materials,
        }
    }

    /// 解析產品配方
    ///
    /// `version` 為 `None` 時使用最新版本。
    pub fn resolve(&self, product_id: &str, version: Option<u32>) -> RecipeResolution {
        let Some(list) = self.recipes.get(product_id) else {
            return RecipeResolution::NoRecipe;
        };

        let recipe = match version {
            Some(v) => list.iter().rev().find(|r| r.version == v),
            None => list.last(),
        };

        match recipe {
            Some(recipe) => RecipeResolution::Resolved(self.resolve_recipe(recipe)),
            None => RecipeResolution::NoRecipe,
        }
    }

    /// 有配方的產品
    pub fn products(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.recipes.keys().copied()
    }

    /// 計算自動組成並標記超量配方
    pub fn resolve_recipe(&self, recipe: &Recipe) -> ResolvedRecipe {
        // 只有第一個中間品組成會被視為自動組成
        let auto_index = recipe
            .components
            .iter()
            .position(|c| self.auto_materials.contains(c.material_id.as_str()));

        let manual_total: Decimal = recipe
            .components
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != auto_index)
            .map(|(_, c)| c.percentage)
            .sum();

        let over_allocated = manual_total > Decimal::ONE_HUNDRED;
        let auto_percentage = (Decimal::ONE_HUNDRED - manual_total).max(Decimal::ZERO);

        let components = recipe
            .components
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let auto = Some(i) == auto_index;
                ResolvedComponent {
                    material_id: c.material_id.clone(),
                    percentage: if auto { auto_percentage } else { c.percentage },
                    auto,
                }
            })
            .collect();

        ResolvedRecipe {
            product_id: recipe.product_id.clone(),
            version: recipe.version,
            components,
            auto_material_id: auto_index.map(|i| recipe.components[i].material_id.clone()),
            manual_total,
            over_allocated,
        }
    }
}
