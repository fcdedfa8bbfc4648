//! 出貨預測產生
//!
//! 由歷史出貨實績或給定數值產生預測記錄。已有出貨實績的日子不產生預測。

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use plan_core::{
    end_of_month, end_of_year, is_weekday, ForecastRecord, PlanningInput, ShipmentActual,
    ShippingCalendar,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// 平日取樣回溯天數
const WEEKDAY_LOOKBACK_DAYS: i64 = 500;

/// 週六係數回溯天數
const SATURDAY_LOOKBACK_DAYS: i64 = 400;
const SATURDAY_SAMPLES: usize = 4;
const SATURDAY_REFERENCE_WEEKDAYS: usize = 20;

/// 固定值預測的結束日
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastHorizon {
    EndOfMonth,
    EndOfYear,
    /// 指定結束日（含）
    Until(NaiveDate),
}

impl ForecastHorizon {
    pub fn end(&self, start: NaiveDate) -> NaiveDate {
        match self {
            ForecastHorizon::EndOfMonth => end_of_month(start),
            ForecastHorizon::EndOfYear => end_of_year(start),
            ForecastHorizon::Until(date) => *date,
        }
    }
}

/// 預測方法
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastMethod {
    /// 最近 `window` 個平日實績的平均，至月底
    Rolling { window: usize },
    /// 每個出貨日固定數量
    Fixed {
        daily: Decimal,
        horizon: ForecastHorizon,
    },
    /// 月總量平均分配到剩餘出貨日，最後一天承接餘數
    MonthTotal { total: Decimal },
}

/// 出貨預測產生器
pub struct ForecastGenerator<'a> {
    shipments: &'a [ShipmentActual],
    calendar: ShippingCalendar,
}

impl<'a> ForecastGenerator<'a> {
    pub fn new(input: &'a PlanningInput, calendar: ShippingCalendar) -> Self {
        Self {
            shipments: &input.actuals.shipments,
            calendar,
        }
    }

    /// 產生某工廠某產品自 `start` 起的預測
    ///
    /// 只回傳數量為正的記錄。
    pub fn generate(
        &self,
        facility_id: &str,
        product_id: &str,
        start: NaiveDate,
        method: &ForecastMethod,
    ) -> Vec<ForecastRecord> {
        let actuals = self.actual_series(facility_id, product_id);
        let planned = match method {
            ForecastMethod::Rolling { window } => self.rolling(&actuals, start, *window),
            ForecastMethod::Fixed { daily, horizon } => self.fixed(start, *daily, horizon.end(start)),
            ForecastMethod::MonthTotal { total } => self.month_total(&actuals, start, *total),
        };

        let records: Vec<ForecastRecord> = planned
            .into_iter()
            .filter(|(date, qty)| *qty > Decimal::ZERO && !actuals.contains_key(date))
            .map(|(date, qty)| ForecastRecord::new(date, facility_id, product_id, qty))
            .collect();

        tracing::debug!(
            "產生出貨預測 {}/{}：{} 筆（{:?}）",
            facility_id,
            product_id,
            records.len(),
            method
        );

        records
    }

    /// 最近 `window` 個平日（週一到週五）出貨實績的平均
    pub fn weekday_average(&self, facility_id: &str, product_id: &str, start: NaiveDate, window: usize) -> Decimal {
        let actuals = self.actual_series(facility_id, product_id);
        average(&weekday_samples(&actuals, start, window))
    }

    /// 週六係數 = 週六平均 / 平日平均
    pub fn saturday_coefficient(&self, facility_id: &str, product_id: &str, start: NaiveDate) -> Decimal {
        let actuals = self.actual_series(facility_id, product_id);
        saturday_coefficient(&actuals, start)
    }

    fn actual_series(&self, facility_id: &str, product_id: &str) -> BTreeMap<NaiveDate, Decimal> {
        let mut series = BTreeMap::new();
        for actual in self
            .shipments
            .iter()
            .filter(|s| s.facility_id == facility_id && s.product_id == product_id)
        {
            *series.entry(actual.date).or_insert(Decimal::ZERO) += actual.quantity;
        }
        series
    }

    fn rolling(
        &self,
        actuals: &BTreeMap<NaiveDate, Decimal>,
        start: NaiveDate,
        window: usize,
    ) -> Vec<(NaiveDate, Decimal)> {
        let weekday = average(&weekday_samples(actuals, start, window));
        let saturday = if self.calendar.ships_saturdays() {
            weekday * saturday_coefficient(actuals, start)
        } else {
            Decimal::ZERO
        };

        dates(start, end_of_month(start))
            .map(|date| {
                let qty = if !self.calendar.is_shipping_day(date) {
                    Decimal::ZERO
                } else if date.weekday() == Weekday::Sat {
                    round(saturday)
                } else {
                    round(weekday)
                };
                (date, qty)
            })
            .collect()
    }

    fn fixed(&self, start: NaiveDate, daily: Decimal, end: NaiveDate) -> Vec<(NaiveDate, Decimal)> {
        dates(start, end)
            .map(|date| {
                let qty = if self.calendar.is_shipping_day(date) {
                    daily
                } else {
                    Decimal::ZERO
                };
                (date, qty)
            })
            .collect()
    }

    fn month_total(
        &self,
        actuals: &BTreeMap<NaiveDate, Decimal>,
        start: NaiveDate,
        total: Decimal,
    ) -> Vec<(NaiveDate, Decimal)> {
        let eligible: Vec<NaiveDate> = dates(start, end_of_month(start))
            .filter(|date| self.calendar.is_shipping_day(*date) && !actuals.contains_key(date))
            .collect();
        if eligible.is_empty() {
            return Vec::new();
        }

        let per_day = total / Decimal::from(eligible.len());
        let mut remaining = total;
        let last = eligible.len() - 1;

        eligible
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let qty = if i == last { remaining } else { round(per_day) };
                remaining -= qty;
                (date, qty)
            })
            .collect()
    }
}

fn dates(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let days = (end - start).num_days().max(-1) + 1;
    (0..days).map(move |offset| start + Duration::days(offset))
}

/// 自 `start` 前一天往回、在回溯範圍內取日期（由近到遠）
fn lookback(
    actuals: &BTreeMap<NaiveDate, Decimal>,
    start: NaiveDate,
    days: i64,
) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
    let earliest = start
        .checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN);
    actuals
        .range(earliest..start)
        .rev()
        .map(|(date, qty)| (*date, *qty))
}

fn weekday_samples(actuals: &BTreeMap<NaiveDate, Decimal>, start: NaiveDate, window: usize) -> Vec<Decimal> {
    lookback(actuals, start, WEEKDAY_LOOKBACK_DAYS)
        .filter(|(date, _)| is_weekday(*date))
        .map(|(_, qty)| qty)
        .take(window)
        .collect()
}

fn saturday_coefficient(actuals: &BTreeMap<NaiveDate, Decimal>, start: NaiveDate) -> Decimal {
    let mut saturdays = Vec::new();
    let mut weekdays = Vec::new();

    for (date, qty) in lookback(actuals, start, SATURDAY_LOOKBACK_DAYS) {
        if saturdays.len() >= SATURDAY_SAMPLES && weekdays.len() >= SATURDAY_REFERENCE_WEEKDAYS {
            break;
        }
        if date.weekday() == Weekday::Sat && saturdays.len() < SATURDAY_SAMPLES {
            saturdays.push(qty);
        }
        if is_weekday(date) && weekdays.len() < SATURDAY_REFERENCE_WEEKDAYS {
            weekdays.push(qty);
        }
    }

    let weekday_avg = average(&weekdays);
    if weekday_avg > Decimal::ZERO {
        average(&saturdays) / weekday_avg
    } else {
        Decimal::ZERO
    }
}

fn average(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
