//! 實績與預測記錄
//!
//! 實績是權威數據：同一鍵存在實績時，計劃值一律被取代。
//! 同一鍵的多筆實績需先加總（支援增量匯入）。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 生產實績
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionActual {
    pub date: NaiveDate,
    pub equipment_id: String,
    pub product_id: String,
    pub quantity: Decimal,
}

impl ProductionActual {
    pub fn new(
        date: NaiveDate,
        equipment_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            date,
            equipment_id: equipment_id.into(),
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// 出貨實績
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentActual {
    pub date: NaiveDate,
    pub facility_id: String,
    pub product_id: String,
    pub quantity: Decimal,
}

impl ShipmentActual {
    pub fn new(
        date: NaiveDate,
        facility_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            date,
            facility_id: facility_id.into(),
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// 期初庫存實績（記錄日當天的期初量）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryActual {
    pub date: NaiveDate,
    pub storage_id: String,
    pub product_id: String,
    pub quantity: Decimal,
}

impl InventoryActual {
    pub fn new(
        date: NaiveDate,
        storage_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            date,
            storage_id: storage_id.into(),
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// 出貨預測（僅在沒有出貨實績時使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub facility_id: String,
    pub product_id: String,
    pub quantity: Decimal,
}

impl ForecastRecord {
    pub fn new(
        date: NaiveDate,
        facility_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            date,
            facility_id: facility_id.into(),
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// 實績集合
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Actuals {
    #[serde(default)]
    pub production: Vec<ProductionActual>,

    #[serde(default)]
    pub shipments: Vec<ShipmentActual>,

    #[serde(default)]
    pub inventory_bod: Vec<InventoryActual>,
}

impl Actuals {
    pub fn is_empty(&self) -> bool {
        self.production.is_empty() && self.shipments.is_empty() && self.inventory_bod.is_empty()
    }

    /// 記錄總筆數
    pub fn len(&self) -> usize {
        self.production.len() + self.shipments.len() + self.inventory_bod.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuals_deserialize() {
        let actuals: Actuals = serde_json::from_str(
            r#"{
                "production": [
                    {"date":"2025-11-01","equipment_id":"KILN-1","product_id":"CLK","quantity":1800}
                ],
                "inventory_bod": [
                    {"date":"2025-11-01","storage_id":"CLK-YARD","product_id":"CLK","quantity":"12000.5"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(actuals.len(), 2);
        assert!(actuals.shipments.is_empty());
        assert_eq!(actuals.production[0].quantity, Decimal::from(1800));
        assert_eq!(
            actuals.inventory_bod[0].quantity,
            Decimal::new(120005, 1)
        );
    }

    #[test]
    fn test_empty_actuals() {
        let actuals = Actuals::default();
        assert!(actuals.is_empty());
        assert_eq!(actuals.len(), 0);
    }
}
