//! # Promotions
//!
//! Discount math for store promotions. One promotion applies per order: the
//! live promotion that saves the customer the most.
//!
//! ## Pizza Pair Half Off
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart pizzas (per unit):  $18.99  $12.99  $16.99  $14.99  $9.99         │
//! │                                                                         │
//! │  1. Sort high → low:      $18.99  $16.99  $14.99  $12.99  $9.99         │
//! │  2. Pair neighbours:     [$18.99  $16.99][$14.99  $12.99] $9.99         │
//! │  3. Cheaper of each pair gets 50% off:                                  │
//! │        $16.99 → -$8.50          $12.99 → -$6.50                         │
//! │  4. Odd one out pays full price                                         │
//! │                                                                         │
//! │  Discount: $15.00                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Promotion, PromotionKind};

/// A promotion that produced a discount for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedPromotion {
    pub promotion_id: String,
    pub name: String,
    pub kind: PromotionKind,
    pub discount_cents: i64,
}

impl AppliedPromotion {
    /// Returns the discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }
}

/// Discount from pairing pizzas; see the module docs.
///
/// ## Arguments
/// * `pizza_unit_prices` - one entry per pizza *unit* (a line of 3 appears 3 times)
/// * `discount_bps` - share taken off the cheaper pizza of each pair
pub fn pizza_pair_discount(pizza_unit_prices: &[Money], discount_bps: u32) -> Money {
    let mut prices = pizza_unit_prices.to_vec();
    prices.sort_unstable_by(|a, b| b.cmp(a));

    prices
        .chunks_exact(2)
        .map(|pair| pair[1].percentage(discount_bps))
        .sum()
}

/// `bps` basis points off the subtotal.
pub fn percent_off(subtotal: Money, bps: u32) -> Money {
    subtotal.percentage(bps)
}

/// A flat amount off, never more than the subtotal.
pub fn fixed_amount_off(subtotal: Money, amount: Money) -> Money {
    amount.min(subtotal).non_negative()
}

/// Computes what `promotion` is worth for this cart right now.
///
/// ## Returns
/// * `Some(AppliedPromotion)` - the promotion is live, the minimum is met
///   and the discount is positive
/// * `None` - it doesn't apply
pub fn evaluate(
    promotion: &Promotion,
    pizza_unit_prices: &[Money],
    subtotal: Money,
    now: DateTime<Utc>,
) -> Option<AppliedPromotion> {
    if !promotion.is_live_at(now) {
        return None;
    }

    if subtotal.cents() < promotion.min_subtotal_cents {
        return None;
    }

    let discount = match promotion.kind {
        PromotionKind::PizzaPairHalfOff => {
            pizza_pair_discount(pizza_unit_prices, clamp_bps(promotion.value))
        }
        PromotionKind::PercentOff => percent_off(subtotal, clamp_bps(promotion.value)),
        PromotionKind::FixedAmountOff => {
            fixed_amount_off(subtotal, Money::from_cents(promotion.value))
        }
    };

    let discount = discount.min(subtotal);
    if !discount.is_positive() {
        return None;
    }

    Some(AppliedPromotion {
        promotion_id: promotion.id.clone(),
        name: promotion.name.clone(),
        kind: promotion.kind,
        discount_cents: discount.cents(),
    })
}

/// Picks the live promotion with the largest discount.
///
/// Ties go to the promotion listed first.
pub fn best_promotion(
    promotions: &[Promotion],
    pizza_unit_prices: &[Money],
    subtotal: Money,
    now: DateTime<Utc>,
) -> Option<AppliedPromotion> {
    promotions
        .iter()
        .filter_map(|p| evaluate(p, pizza_unit_prices, subtotal, now))
        .fold(None, |best: Option<AppliedPromotion>, candidate| match best {
            Some(current) if current.discount_cents >= candidate.discount_cents => Some(current),
            _ => Some(candidate),
        })
}

fn clamp_bps(value: i64) -> u32 {
    value.clamp(0, 10_000) as u32
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_PAIR_DISCOUNT_BPS;
    use chrono::Duration;

    fn cents(values: &[i64]) -> Vec<Money> {
        values.iter().map(|c| Money::from_cents(*c)).collect()
    }

    fn promo(id: &str, kind: PromotionKind, value: i64) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            kind,
            value,
            min_subtotal_cents: 0,
            starts_at: None,
            ends_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pair_discount_matches_worked_example() {
        let prices = cents(&[1899, 1299, 1699, 1499, 999]);
        let discount = pizza_pair_discount(&prices, DEFAULT_PAIR_DISCOUNT_BPS);
        // 1699 / 2 = 849.5 → 850, 1299 / 2 = 649.5 → 650
        assert_eq!(discount.cents(), 1500);
    }

    #[test]
    fn test_pair_discount_needs_two_pizzas() {
        assert!(pizza_pair_discount(&[], DEFAULT_PAIR_DISCOUNT_BPS).is_zero());
        assert!(pizza_pair_discount(&cents(&[1499]), DEFAULT_PAIR_DISCOUNT_BPS).is_zero());
        assert_eq!(
            pizza_pair_discount(&cents(&[1499, 1499]), DEFAULT_PAIR_DISCOUNT_BPS).cents(),
            750
        );
    }

    #[test]
    fn test_pair_discount_is_order_independent() {
        let a = pizza_pair_discount(&cents(&[999, 1899, 1299, 1499]), DEFAULT_PAIR_DISCOUNT_BPS);
        let b = pizza_pair_discount(&cents(&[1499, 1299, 1899, 999]), DEFAULT_PAIR_DISCOUNT_BPS);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_amount_capped_at_subtotal() {
        let discount = fixed_amount_off(Money::from_cents(300), Money::from_cents(500));
        assert_eq!(discount.cents(), 300);
    }

    #[test]
    fn test_evaluate_respects_minimum_and_window() {
        let now = Utc::now();
        let mut promotion = promo("ten-off", PromotionKind::FixedAmountOff, 1000);
        promotion.min_subtotal_cents = 4000;

        assert!(evaluate(&promotion, &[], Money::from_cents(3999), now).is_none());
        let applied = evaluate(&promotion, &[], Money::from_cents(4000), now).unwrap();
        assert_eq!(applied.discount_cents, 1000);

        promotion.ends_at = Some(now - Duration::minutes(1));
        assert!(evaluate(&promotion, &[], Money::from_cents(5000), now).is_none());
    }

    #[test]
    fn test_evaluate_skips_zero_discounts() {
        let now = Utc::now();
        let pair = promo("pair", PromotionKind::PizzaPairHalfOff, 5000);
        assert!(evaluate(&pair, &cents(&[1499]), Money::from_cents(1499), now).is_none());
    }

    #[test]
    fn test_best_promotion_picks_largest_discount() {
        let now = Utc::now();
        let promotions = vec![
            promo("ten-percent", PromotionKind::PercentOff, 1000),
            promo("pair", PromotionKind::PizzaPairHalfOff, 5000),
            promo("five-off", PromotionKind::FixedAmountOff, 500),
        ];
        let pizzas = cents(&[1599, 1599]);
        let subtotal = Money::from_cents(3198 + 899);

        let best = best_promotion(&promotions, &pizzas, subtotal, now).unwrap();
        assert_eq!(best.promotion_id, "pair");
        assert_eq!(best.discount_cents, 800);
    }

    #[test]
    fn test_best_promotion_tie_keeps_first() {
        let now = Utc::now();
        let promotions = vec![
            promo("first", PromotionKind::FixedAmountOff, 500),
            promo("second", PromotionKind::FixedAmountOff, 500),
        ];
        let best = best_promotion(&promotions, &[], Money::from_cents(2000), now).unwrap();
        assert_eq!(best.promotion_id, "first");
    }
}
