//! 警示摘要

use chrono::NaiveDate;
use plan_core::{Severity, Storage, StorageDayResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 單一儲倉單日警示
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageAlert {
    pub storage_id: String,
    pub severity: Severity,
    pub eod: Decimal,
    pub capacity: Option<Decimal>,
    pub reason: Option<String>,
}

/// 連續相同警示的日期區間
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRange {
    pub storage_id: String,
    pub severity: Severity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

/// 依日期列出所有非正常儲倉
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertSummary {
    pub by_date: BTreeMap<NaiveDate, Vec<StorageAlert>>,
}

impl AlertSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 收集儲倉時間序列中的警示
    pub fn collect<'s>(
        series: impl IntoIterator<Item = (&'s Storage, &'s [StorageDayResult])>,
    ) -> Self {
        let mut summary = Self::new();
        for (storage, days) in series {
            for day in days.iter().filter(|day| day.severity.is_alert()) {
                summary.add(
                    day.date,
                    StorageAlert {
                        storage_id: storage.id.clone(),
                        severity: day.severity,
                        eod: day.eod,
                        capacity: storage.max_capacity,
                        reason: day.reason.clone(),
                    },
                );
            }
        }
        summary
    }

    /// 添加警示（同日依儲倉排序）
    pub fn add(&mut self, date: NaiveDate, alert: StorageAlert) {
        let alerts = self.by_date.entry(date).or_default();
        let pos = alerts.partition_point(|a| a.storage_id <= alert.storage_id);
        alerts.insert(pos, alert);
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// 警示總數
    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn alerts_on(&self, date: NaiveDate) -> &[StorageAlert] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.iter().filter(|(_, a)| a.severity == severity).count()
    }

    /// 各等級的警示數
    pub fn counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for (_, alert) in self.iter() {
            *counts.entry(alert.severity).or_insert(0) += 1;
        }
        counts
    }

    /// 第一個缺貨日
    pub fn first_stockout(&self) -> Option<NaiveDate> {
        self.iter()
            .find(|(_, a)| a.severity == Severity::Stockout)
            .map(|(date, _)| date)
    }

    /// 距離 `today`（含）之後第一個缺貨日的天數
    pub fn days_until_first_stockout(&self, today: NaiveDate) -> Option<i64> {
        self.by_date
            .range(today..)
            .find(|(_, alerts)| alerts.iter().any(|a| a.severity == Severity::Stockout))
            .map(|(date, _)| (*date - today).num_days())
    }

    /// 將同儲倉、同等級的連續日期合併為區間
    pub fn grouped(&self) -> Vec<AlertRange> {
        let mut by_storage: BTreeMap<&str, Vec<(NaiveDate, Severity)>> = BTreeMap::new();
        for (date, alert) in self.iter() {
            by_storage
                .entry(alert.storage_id.as_str())
                .or_default()
                .push((date, alert.severity));
        }

        let mut ranges = Vec::new();
        for (storage_id, days) in by_storage {
            let mut current: Option<AlertRange> = None;
            for (date, severity) in days {
                if let Some(range) = current.as_mut() {
                    if range.severity == severity && range.end.succ_opt() == Some(date) {
                        range.end = date;
                        range.days += 1;
                        continue;
                    }
                }
                ranges.extend(current.take());
                current = Some(AlertRange {
                    storage_id: storage_id.to_string(),
                    severity,
                    start: date,
                    end: date,
                    days: 1,
                });
            }
            ranges.extend(current);
        }

        ranges
    }

    fn iter(&self) -> impl Iterator<Item = (NaiveDate, &StorageAlert)> + '_ {
        self.by_date
            .iter()
            .flat_map(|(date, alerts)| alerts.iter().map(move |a| (*date, a)))
    }
}
