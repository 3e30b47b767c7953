//! # Customization Pricing
//!
//! Prices one menu item from the customer's selected options.
//!
//! ## The Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit_price = base_price + Σ (option.price_modifier × quantity)         │
//! │                                                                         │
//! │  Large Pizza                         $14.99   (base)                    │
//! │    Crust: Thin          (SINGLE)      $0.00   (free, default)           │
//! │    Toppings (max 5)     (MULTI)                                         │
//! │      Pepperoni ×2                     $3.50   ($1.75 × 2)               │
//! │      Mushrooms                        $1.75                             │
//! │      Fresh Basil                      $0.00   (free)                    │
//! │  ─────────────────────────────────────────────                          │
//! │  unit_price                          $20.24                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules (checked in this order)
//! 1. Every selected option must belong to an active group attached to the
//!    item and be active itself.
//! 2. Every entry's quantity must be within `1..=MAX_OPTION_QUANTITY`; repeated
//!    entries for one option are then merged and the sum checked again.
//! 3. A group with no selection falls back to its default options.
//! 4. `SINGLE_SELECT`: at most one option, quantity exactly 1.
//! 5. `MULTI_SELECT`: at most `max_selections` distinct options.
//! 6. At least `min_selections` distinct options (1 when `is_required`).
//!
//! Selection counts are counts of *distinct options*: "double pepperoni" is
//! one topping with quantity 2.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::PricingError;
use crate::money::Money;
use crate::types::{CustomizationGroup, CustomizationOption, GroupWithOptions, SelectionType};
use crate::MAX_OPTION_QUANTITY;

// =============================================================================
// Input / Output Types
// =============================================================================

/// One option picked in the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SelectedOption {
    pub option_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl SelectedOption {
    /// Selects `option_id` once.
    pub fn one(option_id: impl Into<String>) -> Self {
        SelectedOption {
            option_id: option_id.into(),
            quantity: 1,
        }
    }

    /// Selects `option_id` `quantity` times.
    pub fn times(option_id: impl Into<String>, quantity: i64) -> Self {
        SelectedOption {
            option_id: option_id.into(),
            quantity,
        }
    }
}

/// A resolved option with its contribution to the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricedSelection {
    pub option_id: String,
    pub group_id: String,
    pub group_name: String,
    pub option_name: String,
    pub price_modifier_cents: i64,
    pub quantity: i64,
    /// `price_modifier_cents × quantity`
    pub line_cents: i64,
    /// Applied because the customer left the group untouched.
    pub is_default: bool,
}

/// The priced result for one unit of a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricedItem {
    pub base_price_cents: i64,
    pub customizations_cents: i64,
    pub unit_price_cents: i64,
    pub selections: Vec<PricedSelection>,
}

impl PricedItem {
    /// Price of one unit.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Option ids with quantities, sorted; two lines with equal keys are the
    /// same configuration.
    pub fn selection_key(&self) -> Vec<(String, i64)> {
        let mut key: Vec<(String, i64)> = self
            .selections
            .iter()
            .map(|s| (s.option_id.clone(), s.quantity))
            .collect();
        key.sort();
        key
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices a menu item.
///
/// ## Arguments
/// * `base_price` - The item's base price
/// * `groups` - Groups attached to the item, in display order
/// * `selections` - What the customer picked (may be empty)
///
/// ## Example
/// ```rust,ignore
/// let priced = price_item(item.base_price(), &groups, &[
///     SelectedOption::times(pepperoni_id, 2),
///     SelectedOption::one(mushroom_id),
/// ])?;
/// assert_eq!(priced.unit_price_cents, 1499 + 175 * 2 + 175);
/// ```
pub fn price_item(
    base_price: Money,
    groups: &[GroupWithOptions],
    selections: &[SelectedOption],
) -> Result<PricedItem, PricingError> {
    let merged = merge_selections(selections)?;

    // Per group: the (option, quantity) pairs the customer chose
    let mut chosen: Vec<Vec<(&CustomizationOption, i64)>> = vec![Vec::new(); groups.len()];

    for (option_id, quantity) in &merged {
        let (group_idx, option) =
            find_option(groups, option_id).ok_or_else(|| PricingError::UnknownOption {
                option_id: option_id.clone(),
            })?;

        check_option_quantity(option_id, *quantity)?;
        chosen[group_idx].push((option, *quantity));
    }

    let mut priced_selections = Vec::new();

    for (entry, picks) in groups.iter().zip(chosen) {
        let group = &entry.group;
        if !group.is_active {
            continue;
        }

        let (picks, is_default) = if picks.is_empty() {
            (default_picks(entry), true)
        } else {
            (picks, false)
        };

        check_limits(group, &picks)?;

        for (option, quantity) in picks {
            priced_selections.push(PricedSelection {
                option_id: option.id.clone(),
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                option_name: option.name.clone(),
                price_modifier_cents: option.price_modifier_cents,
                quantity,
                line_cents: option.price_modifier().multiply_quantity(quantity).cents(),
                is_default,
            });
        }
    }

    let customizations: Money = priced_selections
        .iter()
        .map(|s| Money::from_cents(s.line_cents))
        .sum();
    let unit_price = (base_price + customizations).non_negative();

    Ok(PricedItem {
        base_price_cents: base_price.cents(),
        customizations_cents: customizations.cents(),
        unit_price_cents: unit_price.cents(),
        selections: priced_selections,
    })
}

/// Checks that a group's limits make sense before it is saved.
///
/// ## Rules
/// - `min_selections >= 0`, `max_selections >= 1` when set
/// - `min_selections <= max_selections`
/// - single-select groups can't ask for more than one option
pub fn validate_group_config(group: &CustomizationGroup) -> Result<(), PricingError> {
    let invalid = |reason: &str| PricingError::InvalidGroupConfig {
        group: group.name.clone(),
        reason: reason.to_string(),
    };

    if group.min_selections < 0 {
        return Err(invalid("minimum cannot be negative"));
    }

    if let Some(max) = group.max_selections {
        if max < 1 {
            return Err(invalid("maximum must be at least 1"));
        }
        if group.effective_min() > max {
            return Err(invalid("minimum exceeds maximum"));
        }
    }

    if group.selection_type == SelectionType::SingleSelect {
        if group.max_selections.map_or(false, |max| max != 1) {
            return Err(invalid("single-select groups allow exactly one option"));
        }
        if group.effective_min() > 1 {
            return Err(invalid("single-select groups cannot require more than one option"));
        }
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Folds repeated option ids into one entry, keeping first-seen order.
///
/// Each entry is range-checked on its own first, so a negative entry can't
/// cancel out an oversized one.
fn merge_selections(selections: &[SelectedOption]) -> Result<Vec<(String, i64)>, PricingError> {
    let mut merged: Vec<(String, i64)> = Vec::with_capacity(selections.len());
    for selection in selections {
        check_option_quantity(&selection.option_id, selection.quantity)?;

        match merged.iter_mut().find(|(id, _)| *id == selection.option_id) {
            Some((_, quantity)) => {
                *quantity = quantity.checked_add(selection.quantity).ok_or_else(|| {
                    PricingError::InvalidOptionQuantity {
                        option_id: selection.option_id.clone(),
                        quantity: i64::MAX,
                        max: MAX_OPTION_QUANTITY,
                    }
                })?;
            }
            None => merged.push((selection.option_id.clone(), selection.quantity)),
        }
    }
    Ok(merged)
}

fn check_option_quantity(option_id: &str, quantity: i64) -> Result<(), PricingError> {
    if (1..=MAX_OPTION_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(PricingError::InvalidOptionQuantity {
            option_id: option_id.to_string(),
            quantity,
            max: MAX_OPTION_QUANTITY,
        })
    }
}

fn find_option<'a>(
    groups: &'a [GroupWithOptions],
    option_id: &str,
) -> Option<(usize, &'a CustomizationOption)> {
    groups
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.group.is_active)
        .find_map(|(idx, entry)| {
            entry
                .options
                .iter()
                .find(|o| o.id == option_id && o.is_active)
                .map(|o| (idx, o))
        })
}

fn default_picks(entry: &GroupWithOptions) -> Vec<(&CustomizationOption, i64)> {
    let mut defaults: Vec<&CustomizationOption> = entry
        .options
        .iter()
        .filter(|o| o.is_active && o.is_default)
        .collect();
    defaults.sort_by_key(|o| o.sort_order);

    if entry.group.selection_type == SelectionType::SingleSelect {
        defaults.truncate(1);
    } else if let Some(max) = entry.group.max_selections {
        defaults.truncate(max.max(0) as usize);
    }

    defaults.into_iter().map(|o| (o, 1)).collect()
}

fn check_limits(
    group: &CustomizationGroup,
    picks: &[(&CustomizationOption, i64)],
) -> Result<(), PricingError> {
    let selected = picks.len() as i64;

    if let Some(max) = group.effective_max() {
        if selected > max {
            return Err(PricingError::TooManySelections {
                group: group.name.clone(),
                max,
                selected,
            });
        }
    }

    if group.selection_type == SelectionType::SingleSelect && picks.iter().any(|(_, q)| *q != 1) {
        return Err(PricingError::SingleSelectQuantity {
            group: group.name.clone(),
        });
    }

    let min = group.effective_min();
    if selected < min {
        return Err(PricingError::TooFewSelections {
            group: group.name.clone(),
            min,
            selected,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn group(
        id: &str,
        selection_type: SelectionType,
        min: i64,
        max: Option<i64>,
    ) -> CustomizationGroup {
        let now = Utc::now();
        CustomizationGroup {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            selection_type,
            is_required: false,
            min_selections: min,
            max_selections: max,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn option(id: &str, group_id: &str, cents: i64, is_default: bool) -> CustomizationOption {
        let now = Utc::now();
        CustomizationOption {
            id: id.to_string(),
            group_id: group_id.to_string(),
            name: id.to_string(),
            price_modifier_cents: cents,
            is_default,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Crust (single, thin default free / stuffed +$2.00) and Toppings
    /// (multi, max 3, $1.75 each, basil free).
    pub(crate) fn pizza_groups() -> Vec<GroupWithOptions> {
        vec![
            GroupWithOptions {
                group: group("crust", SelectionType::SingleSelect, 0, None),
                options: vec![
                    option("thin", "crust", 0, true),
                    option("stuffed", "crust", 200, false),
                ],
            },
            GroupWithOptions {
                group: group("toppings", SelectionType::MultiSelect, 0, Some(3)),
                options: vec![
                    option("pepperoni", "toppings", 175, false),
                    option("mushroom", "toppings", 175, false),
                    option("onion", "toppings", 175, false),
                    option("sausage", "toppings", 175, false),
                    option("basil", "toppings", 0, false),
                ],
            },
        ]
    }

    const BASE: Money = Money::from_cents(1499);

    #[test]
    fn test_total_is_base_plus_modifier_times_quantity() {
        let priced = price_item(
            BASE,
            &pizza_groups(),
            &[
                SelectedOption::one("stuffed"),
                SelectedOption::times("pepperoni", 2),
                SelectedOption::one("mushroom"),
            ],
        )
        .unwrap();

        assert_eq!(priced.customizations_cents, 200 + 175 * 2 + 175);
        assert_eq!(priced.unit_price_cents, 1499 + 200 + 350 + 175);
        assert_eq!(priced.base_price_cents, 1499);
    }

    #[test]
    fn test_free_options_never_change_the_price() {
        for quantity in 1..=MAX_OPTION_QUANTITY {
            let priced = price_item(
                BASE,
                &pizza_groups(),
                &[SelectedOption::times("basil", quantity)],
            )
            .unwrap();
            assert_eq!(priced.unit_price_cents, 1499, "basil x{quantity}");
        }
    }

    #[test]
    fn test_single_select_contributes_at_most_one_option() {
        let err = price_item(
            BASE,
            &pizza_groups(),
            &[SelectedOption::one("thin"), SelectedOption::one("stuffed")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            PricingError::TooManySelections {
                group: "crust".to_string(),
                max: 1,
                selected: 2
            }
        );

        let err = price_item(BASE, &pizza_groups(), &[SelectedOption::times("stuffed", 2)])
            .unwrap_err();
        assert!(matches!(err, PricingError::SingleSelectQuantity { .. }));
    }

    #[test]
    fn test_multi_select_rejects_more_than_max() {
        let err = price_item(
            BASE,
            &pizza_groups(),
            &[
                SelectedOption::one("pepperoni"),
                SelectedOption::one("mushroom"),
                SelectedOption::one("onion"),
                SelectedOption::one("sausage"),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::TooManySelections { max: 3, selected: 4, .. }
        ));

        // Exactly max is fine, and a multiplier doesn't count as extra options
        let priced = price_item(
            BASE,
            &pizza_groups(),
            &[
                SelectedOption::times("pepperoni", 3),
                SelectedOption::one("mushroom"),
                SelectedOption::one("onion"),
            ],
        )
        .unwrap();
        assert_eq!(priced.unit_price_cents, 1499 + 175 * 5);
    }

    #[test]
    fn test_defaults_apply_when_group_untouched() {
        let priced = price_item(BASE, &pizza_groups(), &[]).unwrap();
        assert_eq!(priced.selections.len(), 1);
        assert_eq!(priced.selections[0].option_id, "thin");
        assert!(priced.selections[0].is_default);
        assert_eq!(priced.unit_price_cents, 1499);

        // Choosing another crust replaces the default
        let priced = price_item(BASE, &pizza_groups(), &[SelectedOption::one("stuffed")]).unwrap();
        assert!(priced.selections.iter().all(|s| s.option_id != "thin"));
    }

    #[test]
    fn test_paid_default_is_charged() {
        let mut groups = pizza_groups();
        groups[1].options[0].is_default = true; // pepperoni by default
        let priced = price_item(BASE, &groups, &[]).unwrap();
        assert_eq!(priced.unit_price_cents, 1499 + 175);
    }

    #[test]
    fn test_duplicate_entries_are_merged() {
        let priced = price_item(
            BASE,
            &pizza_groups(),
            &[SelectedOption::one("pepperoni"), SelectedOption::one("pepperoni")],
        )
        .unwrap();
        let pepperoni = priced
            .selections
            .iter()
            .find(|s| s.option_id == "pepperoni")
            .unwrap();
        assert_eq!(pepperoni.quantity, 2);
        assert_eq!(pepperoni.line_cents, 350);
    }

    #[test]
    fn test_unknown_and_inactive_options_rejected() {
        let err = price_item(BASE, &pizza_groups(), &[SelectedOption::one("anchovy")]).unwrap_err();
        assert!(matches!(err, PricingError::UnknownOption { .. }));

        let mut groups = pizza_groups();
        groups[1].options[1].is_active = false;
        let err = price_item(BASE, &groups, &[SelectedOption::one("mushroom")]).unwrap_err();
        assert!(matches!(err, PricingError::UnknownOption { .. }));

        let mut groups = pizza_groups();
        groups[1].group.is_active = false;
        let err = price_item(BASE, &groups, &[SelectedOption::one("pepperoni")]).unwrap_err();
        assert!(matches!(err, PricingError::UnknownOption { .. }));
    }

    #[test]
    fn test_option_quantity_bounds() {
        for quantity in [0, -1, MAX_OPTION_QUANTITY + 1] {
            let err = price_item(
                BASE,
                &pizza_groups(),
                &[SelectedOption::times("pepperoni", quantity)],
            )
            .unwrap_err();
            assert!(matches!(err, PricingError::InvalidOptionQuantity { .. }));
        }
    }

    #[test]
    fn test_merged_quantities_checked_per_entry_and_in_total() {
        // A negative entry can't offset an oversized one
        let err = price_item(
            BASE,
            &pizza_groups(),
            &[
                SelectedOption::times("pepperoni", 12),
                SelectedOption::times("pepperoni", -10),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidOptionQuantity { quantity: 12, .. }
        ));

        // Huge values are rejected before they are summed
        let err = price_item(
            BASE,
            &pizza_groups(),
            &[
                SelectedOption::times("pepperoni", i64::MAX),
                SelectedOption::one("pepperoni"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::InvalidOptionQuantity { .. }));

        // Each entry is fine, the sum is not
        let err = price_item(
            BASE,
            &pizza_groups(),
            &[
                SelectedOption::times("pepperoni", 6),
                SelectedOption::times("pepperoni", 6),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidOptionQuantity { quantity: 12, .. }
        ));
    }

    #[test]
    fn test_required_group_without_default() {
        let groups = vec![GroupWithOptions {
            group: CustomizationGroup {
                is_required: true,
                ..group("bread", SelectionType::SingleSelect, 0, None)
            },
            options: vec![
                option("white", "bread", 0, false),
                option("wheat", "bread", 0, false),
            ],
        }];

        let err = price_item(Money::from_cents(899), &groups, &[]).unwrap_err();
        assert_eq!(
            err,
            PricingError::TooFewSelections {
                group: "bread".to_string(),
                min: 1,
                selected: 0
            }
        );
        assert!(price_item(Money::from_cents(899), &groups, &[SelectedOption::one("wheat")]).is_ok());
    }

    #[test]
    fn test_negative_modifiers_never_push_below_zero() {
        let groups = vec![GroupWithOptions {
            group: group("remove", SelectionType::MultiSelect, 0, None),
            options: vec![option("no-cheese", "remove", -150, false)],
        }];
        let priced = price_item(Money::from_cents(100), &groups, &[SelectedOption::one("no-cheese")])
            .unwrap();
        assert_eq!(priced.customizations_cents, -150);
        assert_eq!(priced.unit_price_cents, 0);
    }

    #[test]
    fn test_selection_key_ignores_order() {
        let a = price_item(
            BASE,
            &pizza_groups(),
            &[SelectedOption::one("pepperoni"), SelectedOption::one("mushroom")],
        )
        .unwrap();
        let b = price_item(
            BASE,
            &pizza_groups(),
            &[SelectedOption::one("mushroom"), SelectedOption::one("pepperoni")],
        )
        .unwrap();
        assert_eq!(a.selection_key(), b.selection_key());
    }

    #[test]
    fn test_validate_group_config() {
        assert!(validate_group_config(&group("ok", SelectionType::MultiSelect, 1, Some(3))).is_ok());
        assert!(validate_group_config(&group("single", SelectionType::SingleSelect, 0, None)).is_ok());

        assert!(validate_group_config(&group("neg", SelectionType::MultiSelect, -1, None)).is_err());
        assert!(validate_group_config(&group("zero", SelectionType::MultiSelect, 0, Some(0))).is_err());
        assert!(validate_group_config(&group("inv", SelectionType::MultiSelect, 4, Some(2))).is_err());
        assert!(validate_group_config(&group("s2", SelectionType::SingleSelect, 0, Some(2))).is_err());
        assert!(validate_group_config(&group("s-min", SelectionType::SingleSelect, 2, None)).is_err());
    }
}
