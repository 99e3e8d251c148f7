use super::money::{Money, Percent};
use serde::{Deserialize, Serialize};

/// One bracket of a progressive commission schedule.
///
/// Volume between this tier's `min` and the next tier's `min` earns
/// `percentage`. The top tier is unbounded. `max` is kept for display only:
/// bracket widths are always inferred from the next tier's `min`, so a `max`
/// that disagrees with its neighbour has no effect on any computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionTier {
    pub min: Money,
    #[serde(default)]
    pub max: Option<Money>,
    pub percentage: Percent,
}

impl CommissionTier {
    pub fn new(min: Money, max: Option<Money>, percentage: Percent) -> Self {
        Self {
            min,
            max,
            percentage,
        }
    }
}

/// A bracket after normalization: its effective width and rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// `None` for the unbounded top bracket.
    pub width: Option<Money>,
    pub percentage: Percent,
}

/// Sorts tiers by `min` and derives each bracket's width from its successor.
pub fn brackets(tiers: &[CommissionTier]) -> Vec<Bracket> {
    let mut sorted = tiers.to_vec();
    sorted.sort_by(|a, b| a.min.cmp(&b.min));

    sorted
        .iter()
        .enumerate()
        .map(|(i, tier)| Bracket {
            width: sorted.get(i + 1).map(|next| next.min - tier.min),
            percentage: tier.percentage,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tier(min: i64, pct: i64) -> CommissionTier {
        CommissionTier::new(
            Money::new(min.into()),
            None,
            Percent::new(pct.into()),
        )
    }

    #[test]
    fn test_brackets_sort_unordered_tiers() {
        let result = brackets(&[tier(1000, 20), tier(0, 10), tier(500, 15)]);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].width, Some(Money::new(dec!(500))));
        assert_eq!(result[0].percentage, Percent::new(dec!(10)));
        assert_eq!(result[1].width, Some(Money::new(dec!(500))));
        assert_eq!(result[2].width, None);
        assert_eq!(result[2].percentage, Percent::new(dec!(20)));
    }

    #[test]
    fn test_brackets_ignore_max() {
        let mut first = tier(0, 10);
        first.max = Some(Money::new(dec!(300)));
        let result = brackets(&[first, tier(1000, 20)]);
        assert_eq!(result[0].width, Some(Money::new(dec!(1000))));
    }

    #[test]
    fn test_tier_deserialization_defaults_max() {
        let json = r#"{"min": "0", "percentage": "10"}"#;
        let parsed: CommissionTier = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.max, None);
        assert_eq!(parsed.percentage, Percent::new(dec!(10)));
    }
}
