//! 生產排程（Campaign）模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PlanError, Result};

/// 設備狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// 生產
    Produce,
    /// 計劃性維修
    Maintenance,
    /// 非計劃停機
    OutOfOrder,
    /// 閒置
    Idle,
}

impl CampaignStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CampaignStatus::Produce => "produce",
            CampaignStatus::Maintenance => "maintenance",
            CampaignStatus::OutOfOrder => "out_of_order",
            CampaignStatus::Idle => "idle",
        }
    }
}

/// 排程區塊：某設備在 [start, end] 期間的固定狀態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignBlock {
    /// 區塊ID
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub equipment_id: String,

    pub status: CampaignStatus,

    /// 產品（僅 produce 狀態必填）
    #[serde(default)]
    pub product_id: Option<String>,

    /// 起始日（含）
    pub start: NaiveDate,

    /// 結束日（含）
    pub end: NaiveDate,

    /// 日產量（僅 produce 狀態有效）
    #[serde(default)]
    pub rate: Option<Decimal>,
}

impl CampaignBlock {
    /// 創建生產區塊
    pub fn produce(
        equipment_id: impl Into<String>,
        product_id: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        rate: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment_id: equipment_id.into(),
            status: CampaignStatus::Produce,
            product_id: Some(product_id.into()),
            start,
            end,
            rate: Some(rate),
        }
    }

    /// 創建非生產區塊（維修、停機、閒置）
    pub fn downtime(
        equipment_id: impl Into<String>,
        status: CampaignStatus,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment_id: equipment_id.into(),
            status,
            product_id: None,
            start,
            end,
            rate: None,
        }
    }

    /// 建構器模式：不指定產量（使用產能上限）
    pub fn without_rate(mut self) -> Self {
        self.rate = None;
        self
    }

    /// 檢查區塊是否有效
    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(PlanError::InvalidCampaign(format!(
                "區塊 {} 結束日 {} 早於起始日 {}",
                self.id, self.end, self.start
            )));
        }
        if self.status == CampaignStatus::Produce && self.product_id.is_none() {
            return Err(PlanError::InvalidCampaign(format!(
                "區塊 {} 為生產狀態但未指定產品",
                self.id
            )));
        }
        Ok(())
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 區塊天數
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// 實際生效的產品（非生產狀態不帶產品）
    pub fn effective_product(&self) -> Option<&str> {
        match self.status {
            CampaignStatus::Produce => self.product_id.as_deref(),
            _ => None,
        }
    }

    /// 實際生效的日產量（非生產狀態不帶產量）
    pub fn effective_rate(&self) -> Option<Decimal> {
        match self.status {
            CampaignStatus::Produce => self.rate,
            _ => None,
        }
    }
}

/// 每日排程記錄（舊資料以每設備每日一筆儲存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCampaign {
    pub equipment_id: String,
    pub date: NaiveDate,
    pub status: CampaignStatus,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub rate: Option<Decimal>,
}

impl DailyCampaign {
    /// 將每日記錄壓縮為區塊
    ///
    /// 同設備、同狀態、同產品、同產量且日期連續的記錄合併為一個區塊。
    pub fn compress(rows: &[DailyCampaign]) -> Vec<CampaignBlock> {
        let mut sorted: Vec<&DailyCampaign> = rows.iter().collect();
        sorted.sort_by(|a, b| {
            a.equipment_id
                .cmp(&b.equipment_id)
                .then_with(|| a.date.cmp(&b.date))
        });

        let mut blocks: Vec<CampaignBlock> = Vec::new();
        for row in sorted {
            if let Some(last) = blocks.last_mut() {
                let contiguous = last.end.succ_opt() == Some(row.date);
                if contiguous
                    && last.equipment_id == row.equipment_id
                    && last.status == row.status
                    && last.product_id == row.product_id
                    && last.rate == row.rate
                {
                    last.end = row.date;
                    continue;
                }
            }

            blocks.push(CampaignBlock {
                id: Uuid::new_v4(),
                equipment_id: row.equipment_id.clone(),
                status: row.status,
                product_id: row.product_id.clone(),
                start: row.date,
                end: row.date,
                rate: row.rate,
            });
        }

        blocks
    }
}
