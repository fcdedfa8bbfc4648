//! 日期軸與出貨日曆

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{PlanError, Result};

/// 連續日期軸 `[start, start + day_count)`
///
/// 模擬必須依日期順序逐日推進，因為每天的期初庫存取決於前一天的期末庫存。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpine {
    start: NaiveDate,
    day_count: u32,
}

impl DateSpine {
    /// 創建日期軸
    ///
    /// 天數必須為正，且最後一天不可溢出日期範圍。
    pub fn new(start: NaiveDate, day_count: u32) -> Result<Self> {
        if day_count == 0 {
            return Err(PlanError::MalformedRange(format!(
                "天數必須大於 0（起始日 {}）",
                start
            )));
        }

        start
            .checked_add_signed(Duration::days(i64::from(day_count) - 1))
            .ok_or_else(|| {
                PlanError::MalformedRange(format!("{} 起 {} 天超出日期範圍", start, day_count))
            })?;

        Ok(Self { start, day_count })
    }

    /// 由起訖日期（含）創建日期軸
    pub fn from_range(start: NaiveDate, end_inclusive: NaiveDate) -> Result<Self> {
        if end_inclusive < start {
            return Err(PlanError::MalformedRange(format!(
                "結束日 {} 早於起始日 {}",
                end_inclusive, start
            )));
        }

        let days = (end_inclusive - start).num_days() + 1;
        let day_count = u32::try_from(days)
            .map_err(|_| PlanError::MalformedRange(format!("日期範圍過長: {} 天", days)))?;

        Self::new(start, day_count)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn len(&self) -> usize {
        self.day_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.day_count == 0
    }

    /// 最後一天（含）
    pub fn end(&self) -> NaiveDate {
        // new() 已驗證不會溢出
        self.start + Duration::days(i64::from(self.day_count) - 1)
    }

    /// 取得第 `index` 天的日期
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index < self.len() {
            Some(self.start + Duration::days(index as i64))
        } else {
            None
        }
    }

    /// 日期在軸上的位置
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if date < self.start {
            return None;
        }
        let offset = (date - self.start).num_days() as usize;
        (offset < self.len()).then_some(offset)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    /// 依序列出所有日期
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.len()).map(move |i| self.start + Duration::days(i as i64))
    }
}

/// 出貨日曆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingCalendar {
    /// 出貨日（週一到週日，true表示出貨）
    /// 索引 0 = 週一, 1 = 週二, ..., 6 = 週日
    pub shipping_days: [bool; 7],

    /// 不出貨的假日
    pub holidays: Vec<NaiveDate>,
}

impl ShippingCalendar {
    /// 創建新的出貨日曆（預設週一到週六出貨）
    pub fn new() -> Self {
        Self {
            shipping_days: [true, true, true, true, true, true, false],
            holidays: Vec::new(),
        }
    }

    /// 只有週一到週五出貨
    pub fn weekdays_only() -> Self {
        Self {
            shipping_days: [true, true, true, true, true, false, false],
            holidays: Vec::new(),
        }
    }

    /// 建構器模式：設置週六是否出貨
    pub fn with_saturday_shipping(mut self, ships: bool) -> Self {
        self.shipping_days[5] = ships;
        self
    }

    /// 建構器模式：設置假日
    pub fn with_holidays(mut self, holidays: Vec<NaiveDate>) -> Self {
        self.holidays = holidays;
        self.holidays.sort();
        self.holidays.dedup();
        self
    }

    /// 添加假日
    pub fn add_holiday(&mut self, date: NaiveDate) {
        if let Err(pos) = self.holidays.binary_search(&date) {
            self.holidays.insert(pos, date);
        }
    }

    /// 檢查是否為出貨日
    pub fn is_shipping_day(&self, date: NaiveDate) -> bool {
        if self.holidays.contains(&date) {
            return false;
        }
        let weekday_index = date.weekday().num_days_from_monday() as usize;
        self.shipping_days[weekday_index]
    }

    pub fn ships_saturdays(&self) -> bool {
        self.shipping_days[Weekday::Sat.num_days_from_monday() as usize]
    }
}

impl Default for ShippingCalendar {
    fn default() -> Self {
        Self::new()
    }
}

/// 是否為週一到週五
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 當月最後一天
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// 當年最後一天
pub fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_create_spine() {
        let spine = DateSpine::new(d(2025, 1, 30), 4).unwrap();

        assert_eq!(spine.len(), 4);
        assert_eq!(spine.end(), d(2025, 2, 2));
        assert_eq!(spine.date_at(2), Some(d(2025, 2, 1)));
        assert_eq!(spine.date_at(4), None);
        assert_eq!(spine.index_of(d(2025, 2, 2)), Some(3));
        assert_eq!(spine.index_of(d(2025, 1, 29)), None);
        assert_eq!(spine.dates().count(), 4);
    }

    #[test]
    fn test_zero_day_spine_is_rejected() {
        let err = DateSpine::new(d(2025, 1, 1), 0).unwrap_err();
        assert!(matches!(err, PlanError::MalformedRange(_)));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        assert!(DateSpine::from_range(d(2025, 3, 1), d(2025, 2, 28)).is_err());

        // 同一天 = 1 天
        let spine = DateSpine::from_range(d(2025, 3, 1), d(2025, 3, 1)).unwrap();
        assert_eq!(spine.len(), 1);
    }

    #[test]
    fn test_multi_year_spine() {
        let spine = DateSpine::from_range(d(2025, 1, 1), d(2027, 12, 31)).unwrap();
        assert_eq!(spine.len(), 365 * 3);
    }

    #[test]
    fn test_shipping_calendar() {
        let calendar = ShippingCalendar::new();

        // 2025-10-11 週六, 2025-10-12 週日
        assert!(calendar.is_shipping_day(d(2025, 10, 11)));
        assert!(!calendar.is_shipping_day(d(2025, 10, 12)));

        let weekdays = ShippingCalendar::weekdays_only();
        assert!(!weekdays.is_shipping_day(d(2025, 10, 11)));
        assert!(!weekdays.ships_saturdays());
    }

    #[test]
    fn test_holidays() {
        let mut calendar = ShippingCalendar::new();
        let holiday = d(2025, 12, 25);
        calendar.add_holiday(holiday);
        calendar.add_holiday(holiday);

        assert_eq!(calendar.holidays.len(), 1);
        assert!(!calendar.is_shipping_day(holiday));
    }

    #[rstest]
    #[case(d(2024, 2, 10), d(2024, 2, 29))]
    #[case(d(2025, 2, 28), d(2025, 2, 28))]
    #[case(d(2025, 4, 1), d(2025, 4, 30))]
    #[case(d(2025, 12, 3), d(2025, 12, 31))]
    fn test_end_of_month(#[case] date: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(end_of_month(date), expected);
    }

    #[test]
    fn test_period_ends() {
        assert_eq!(end_of_year(d(2025, 6, 1)), d(2025, 12, 31));
        assert!(is_weekday(d(2025, 10, 10)));
        assert!(!is_weekday(d(2025, 10, 11)));
    }
}
