//! 配方模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 配方組成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    /// 投入物料
    pub material_id: String,

    /// 百分比（0-100）
    pub percentage: Decimal,
}

impl RecipeComponent {
    pub fn new(material_id: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            material_id: material_id.into(),
            percentage,
        }
    }
}

/// 配方：(產品, 版本) → 組成清單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub product_id: String,

    #[serde(default = "default_version")]
    pub version: u32,

    pub components: Vec<RecipeComponent>,
}

fn default_version() -> u32 {
    1
}

impl Recipe {
    /// 創建新的配方（版本 1）
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            version: 1,
            components: Vec::new(),
        }
    }

    /// 建構器模式：設置版本
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// 建構器模式：添加組成
    pub fn with_component(mut self, material_id: impl Into<String>, percentage: Decimal) -> Self {
        self.components
            .push(RecipeComponent::new(material_id, percentage));
        self
    }

    /// 組成百分比總和（未做自動補足）
    pub fn stated_total(&self) -> Decimal {
        self.components.iter().map(|c| c.percentage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_builder() {
        let recipe = Recipe::new("CEM-I")
            .with_version(2)
            .with_component("CLK", Decimal::ZERO)
            .with_component("GYP", Decimal::from(5))
            .with_component("LST", Decimal::from(4));

        assert_eq!(recipe.version, 2);
        assert_eq!(recipe.components.len(), 3);
        assert_eq!(recipe.stated_total(), Decimal::from(9));
    }

    #[test]
    fn test_recipe_deserialize_defaults() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"product_id":"CEM-I","components":[{"material_id":"GYP","percentage":5}]}"#,
        )
        .unwrap();

        assert_eq!(recipe.version, 1);
        assert_eq!(recipe.components[0].percentage, Decimal::from(5));
    }
}
