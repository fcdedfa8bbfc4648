//! 排程解析：區塊 → 每日狀態
//!
//! 每台設備的排程以排序且不重疊的區間儲存，查詢時二分搜尋，
//! 不會為多年期間的每一天展開記錄。

use chrono::NaiveDate;
use plan_core::{CampaignBlock, CampaignStatus};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 某設備某天的排程
#[derive(Debug, Clone, PartialEq)]
pub struct DayAssignment {
    pub status: CampaignStatus,
    pub product_id: Option<String>,
    pub rate: Option<Decimal>,
    /// 來源區塊（沒有區塊覆蓋時為 None）
    pub block_id: Option<Uuid>,
}

impl DayAssignment {
    /// 未排程 = 閒置
    pub fn idle() -> Self {
        Self {
            status: CampaignStatus::Idle,
            product_id: None,
            rate: None,
            block_id: None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.block_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Interval {
    start: NaiveDate,
    end: NaiveDate,
    block_id: Uuid,
    status: CampaignStatus,
    product_id: Option<String>,
    rate: Option<Decimal>,
}

impl Interval {
    fn from_block(block: &CampaignBlock) -> Self {
        Self {
            start: block.start,
            end: block.end,
            block_id: block.id,
            status: block.status,
            product_id: block.effective_product().map(str::to_string),
            rate: block.effective_rate(),
        }
    }
}

/// 設備排程表
#[derive(Debug, Clone, Default)]
pub struct CampaignSchedule {
    by_equipment: BTreeMap<String, Vec<Interval>>,
}

impl CampaignSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 套用區塊
    ///
    /// 與既有區間重疊的日子由新區塊取代（後套用者優先），
    /// 既有區間被切分保留未重疊的部分。
    pub fn apply(&mut self, block: &CampaignBlock) -> plan_core::Result<()> {
        block.validate()?;

        self.clear_range(&block.equipment_id, block.start, block.end);

        let intervals = self
            .by_equipment
            .entry(block.equipment_id.clone())
            .or_default();
        let pos = intervals.partition_point(|iv| iv.start < block.start);
        intervals.insert(pos, Interval::from_block(block));

        Ok(())
    }

    /// 清除區間：這些日子回到未排程（閒置）
    pub fn clear_range(&mut self, equipment_id: &str, start: NaiveDate, end: NaiveDate) {
        let Some(intervals) = self.by_equipment.get_mut(equipment_id) else {
            return;
        };

        let mut kept = Vec::with_capacity(intervals.len() + 1);
        for iv in intervals.drain(..) {
            if iv.end < start || iv.start > end {
                kept.push(iv);
                continue;
            }

            // 左側殘餘
            if iv.start < start {
                if let Some(left_end) = start.pred_opt() {
                    kept.push(Interval {
                        end: left_end,
                        ..iv.clone()
                    });
                }
            }

            // 右側殘餘
            if iv.end > end {
                if let Some(right_start) = end.succ_opt() {
                    kept.push(Interval {
                        start: right_start,
                        ..iv
                    });
                }
            }
        }

        if kept.is_empty() {
            self.by_equipment.remove(equipment_id);
        } else {
            *intervals = kept;
        }
    }

    /// 查詢某設備某天的排程
    pub fn resolve(&self, equipment_id: &str, date: NaiveDate) -> DayAssignment {
        let Some(intervals) = self.by_equipment.get(equipment_id) else {
            return DayAssignment::idle();
        };

        let idx = intervals.partition_point(|iv| iv.start <= date);
        match idx.checked_sub(1).map(|i| &intervals[i]) {
            Some(iv) if iv.end >= date => DayAssignment {
                status: iv.status,
                product_id: iv.product_id.clone(),
                rate: iv.rate,
                block_id: Some(iv.block_id),
            },
            _ => DayAssignment::idle(),
        }
    }

    /// 有排程的設備
    pub fn equipment_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_equipment.keys().map(String::as_str)
    }

    /// 某設備目前的區間數
    pub fn interval_count(&self, equipment_id: &str) -> usize {
        self.by_equipment
            .get(equipment_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// 以區塊形式列出某設備目前的排程（依日期排序）
    pub fn blocks_for(&self, equipment_id: &str) -> Vec<CampaignBlock> {
        self.by_equipment
            .get(equipment_id)
            .map(|intervals| {
                intervals
                    .iter()
                    .map(|iv| CampaignBlock {
                        id: iv.block_id,
                        equipment_id: equipment_id.to_string(),
                        status: iv.status,
                        product_id: iv.product_id.clone(),
                        start: iv.start,
                        end: iv.end,
                        rate: iv.rate,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
