//! 庫存警示分類

use plan_core::Severity;
use rust_decimal::{Decimal, RoundingStrategy};

/// 分類結果
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub severity: Severity,
    pub reason: Option<String>,
    /// 期末庫存 / 容量（未設定容量、容量為 0 或溢位時為 None）
    pub fill_ratio: Option<Decimal>,
}

/// 警示分類器
#[derive(Debug, Clone, Copy)]
pub struct AlertClassifier {
    high_water_ratio: Decimal,
}

impl AlertClassifier {
    pub fn new(high_water_ratio: Decimal) -> Self {
        Self { high_water_ratio }
    }

    /// 分類期末庫存
    ///
    /// 依序判斷：缺貨（≤ 0）、超出容量、接近容量、正常。
    pub fn classify(&self, eod: Decimal, capacity: Option<Decimal>) -> Classification {
        let fill_ratio = capacity
            .filter(|c| *c > Decimal::ZERO)
            .and_then(|c| eod.checked_div(c));

        if eod <= Decimal::ZERO {
            return Classification {
                severity: Severity::Stockout,
                reason: Some(format!("stockout: ending inventory {}", eod.normalize())),
                fill_ratio,
            };
        }

        let Some(capacity) = capacity else {
            return Classification {
                severity: Severity::Normal,
                reason: None,
                fill_ratio,
            };
        };

        if eod > capacity {
            return Classification {
                severity: Severity::Full,
                reason: Some(format!(
                    "over capacity by {} ({}% of {})",
                    (eod - capacity).normalize(),
                    percent(fill_ratio),
                    capacity.normalize()
                )),
                fill_ratio,
            };
        }

        let near_capacity = capacity
            .checked_mul(self.high_water_ratio)
            .is_some_and(|threshold| eod > threshold);
        if near_capacity {
            return Classification {
                severity: Severity::NearCapacity,
                reason: Some(format!("at {}% of capacity", percent(fill_ratio))),
                fill_ratio,
            };
        }

        Classification {
            severity: Severity::Normal,
            reason: None,
            fill_ratio,
        }
    }
}

impl Default for AlertClassifier {
    fn default() -> Self {
        Self::new(Decimal::new(75, 2))
    }
}

fn percent(ratio: Option<Decimal>) -> Decimal {
    ratio
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn qty(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[rstest]
    #[case(-750, Some(1000), Severity::Stockout)]
    #[case(0, Some(1000), Severity::Stockout)]
    #[case(0, None, Severity::Stockout)]
    #[case(150, Some(1000), Severity::Normal)]
    #[case(750, Some(1000), Severity::Normal)]
    #[case(751, Some(1000), Severity::NearCapacity)]
    #[case(1000, Some(1000), Severity::NearCapacity)]
    #[case(1001, Some(1000), Severity::Full)]
    #[case(999_999, None, Severity::Normal)]
    fn test_classify(#[case] eod: i64, #[case] capacity: Option<i64>, #[case] expected: Severity) {
        let classifier = AlertClassifier::default();
        let result = classifier.classify(qty(eod), capacity.map(qty));

        assert_eq!(result.severity, expected);
        assert_eq!(result.reason.is_some(), expected.is_alert());
    }

    #[test]
    fn test_near_capacity_reason() {
        let classifier = AlertClassifier::default();
        let result = classifier.classify(qty(920), Some(qty(1000)));

        assert_eq!(result.reason.as_deref(), Some("at 92% of capacity"));
        assert_eq!(result.fill_ratio, Some(Decimal::new(92, 2)));
    }

    #[rstest]
    #[case(Decimal::from(10_000_000_000i64), Decimal::new(1, 20), Severity::Full)]
    #[case(Decimal::from(10_000_000_000i64), Decimal::MAX, Severity::Normal)]
    fn test_extreme_capacity_does_not_overflow(
        #[case] eod: Decimal,
        #[case] capacity: Decimal,
        #[case] expected: Severity,
    ) {
        let result = AlertClassifier::default().classify(eod, Some(capacity));

        assert_eq!(result.severity, expected);
        if expected == Severity::Full {
            assert_eq!(result.fill_ratio, None);
        }
    }

    #[test]
    fn test_oversized_ratio_is_not_near_capacity() {
        let classifier = AlertClassifier::new(Decimal::from(1_000_000_000i64));

        let result = classifier.classify(qty(900), Some(Decimal::MAX / Decimal::from(2)));
        assert_eq!(result.severity, Severity::Normal);
    }

    #[test]
    fn test_custom_ratio() {
        let classifier = AlertClassifier::new(Decimal::new(9, 1));

        assert_eq!(
            classifier.classify(qty(850), Some(qty(1000))).severity,
            Severity::Normal
        );
        assert_eq!(
            classifier.classify(qty(950), Some(qty(1000))).severity,
            Severity::NearCapacity
        );
    }

    #[test]
    fn test_zero_capacity_with_stock_is_full() {
        let classifier = AlertClassifier::default();
        let result = classifier.classify(qty(5), Some(Decimal::ZERO));

        assert_eq!(result.severity, Severity::Full);
        assert_eq!(result.fill_ratio, None);
    }
}
