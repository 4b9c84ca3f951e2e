//! Line and document total computation.
//!
//! All arithmetic is exact `Decimal`. Line totals are rounded when an item
//! is priced for storage; document totals are rounded only by
//! [`Totals::rounded`]. Inputs are accepted only at the precision they are
//! stored with, so totals recomputed from a stored document match.

use rust_decimal::Decimal;

use hivedrive_shared::types::LineItemId;
use hivedrive_shared::types::money::{
    MAX_AMOUNT, MAX_QUANTITY, PERCENT_SCALE, QUANTITY_SCALE, fits, fits_amount, round_currency,
};

use crate::pricing::error::PricingError;
use crate::pricing::types::{ItemType, LineItem, LineItemInput, Percentages, Totals};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Stateless pricing calculations.
pub struct PricingService;

impl PricingService {
    /// Unrounded line total: `quantity * unit_price * (1 - discount/100)`.
    ///
    /// `None` when the product does not fit a `Decimal`.
    #[must_use]
    pub fn line_total(
        quantity: Decimal,
        unit_price: Decimal,
        discount_percent: Decimal,
    ) -> Option<Decimal> {
        let remaining = Decimal::ONE.checked_sub(discount_percent.checked_div(HUNDRED)?)?;
        quantity.checked_mul(unit_price)?.checked_mul(remaining)
    }

    /// Validates one submitted line item.
    ///
    /// # Errors
    ///
    /// Returns the first rule the item breaks.
    pub fn validate_item(item: &LineItemInput) -> Result<(), PricingError> {
        if item.description.trim().is_empty() {
            return Err(PricingError::MissingDescription);
        }
        if item.item_type == ItemType::Part && item.part_id.is_none() {
            return Err(PricingError::MissingPart);
        }
        if item.quantity <= Decimal::ZERO {
            return Err(PricingError::NonPositiveQuantity(item.quantity));
        }
        if !fits(item.quantity, QUANTITY_SCALE, MAX_QUANTITY) {
            return Err(PricingError::QuantityNotStorable(item.quantity));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(PricingError::NegativeUnitPrice(item.unit_price));
        }
        if !fits_amount(item.unit_price) {
            return Err(PricingError::UnitPriceNotStorable(item.unit_price));
        }
        if !is_percent(item.discount_percent) {
            return Err(PricingError::LineDiscountOutOfRange(item.discount_percent));
        }
        if !has_percent_scale(item.discount_percent) {
            return Err(PricingError::PercentPrecision(item.discount_percent));
        }
        Ok(())
    }

    /// Validates document-level percentages.
    ///
    /// # Errors
    ///
    /// Returns `DiscountOutOfRange` or `TaxOutOfRange`.
    pub fn validate_percentages(percentages: Percentages) -> Result<(), PricingError> {
        if !is_percent(percentages.discount_percent) {
            return Err(PricingError::DiscountOutOfRange(
                percentages.discount_percent,
            ));
        }
        if !is_percent(percentages.tax_percent) {
            return Err(PricingError::TaxOutOfRange(percentages.tax_percent));
        }
        for value in [percentages.discount_percent, percentages.tax_percent] {
            if !has_percent_scale(value) {
                return Err(PricingError::PercentPrecision(value));
            }
        }
        Ok(())
    }

    /// Validates and prices submitted items, assigning fresh IDs and
    /// positions.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; nothing is priced in that case.
    pub fn price_items(inputs: &[LineItemInput]) -> Result<Vec<LineItem>, PricingError> {
        inputs.iter().try_for_each(Self::validate_item)?;

        inputs
            .iter()
            .zip(0..)
            .map(|(input, position)| {
                let total =
                    Self::line_total(input.quantity, input.unit_price, input.discount_percent)
                        .map(round_currency)
                        .filter(|total| *total <= MAX_AMOUNT)
                        .ok_or(PricingError::TotalTooLarge)?;
                Ok(LineItem {
                    id: LineItemId::new(),
                    item_type: input.item_type,
                    part_id: input.part_id,
                    description: input.description.trim().to_string(),
                    description_en: input.description_en.clone(),
                    quantity: input.quantity,
                    unit_price: input.unit_price,
                    discount_percent: input.discount_percent,
                    total,
                    sort_order: position,
                })
            })
            .collect()
    }

    /// Computes document totals from line totals.
    ///
    /// - `subtotal = sum of line totals`
    /// - `discount_amount = subtotal * discount / 100`
    /// - `tax_amount = (subtotal - discount_amount) * tax / 100`
    /// - `total = subtotal - discount_amount + tax_amount`
    ///
    /// An empty item list gives all-zero totals. The result is unrounded;
    /// `None` when an intermediate amount does not fit a `Decimal`.
    #[must_use]
    pub fn compute_totals(items: &[LineItem], percentages: Percentages) -> Option<Totals> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))?;
        Self::totals_from_subtotal(subtotal, percentages)
    }

    /// Same as [`PricingService::compute_totals`] for a known subtotal.
    #[must_use]
    pub fn totals_from_subtotal(subtotal: Decimal, percentages: Percentages) -> Option<Totals> {
        let discount_amount = subtotal
            .checked_mul(percentages.discount_percent)?
            .checked_div(HUNDRED)?;
        let taxable = subtotal.checked_sub(discount_amount)?;
        let tax_amount = taxable
            .checked_mul(percentages.tax_percent)?
            .checked_div(HUNDRED)?;

        Some(Totals {
            subtotal,
            discount_amount,
            tax_amount,
            total: taxable.checked_add(tax_amount)?,
        })
    }

    /// Validates percentages and returns totals at currency precision.
    ///
    /// # Errors
    ///
    /// Returns `DiscountOutOfRange`, `TaxOutOfRange` or `PercentPrecision`
    /// for bad rates, and `TotalTooLarge` when any amount would not fit its
    /// column.
    pub fn recompute(items: &[LineItem], percentages: Percentages) -> Result<Totals, PricingError> {
        Self::validate_percentages(percentages)?;
        let totals = Self::compute_totals(items, percentages)
            .ok_or(PricingError::TotalTooLarge)?
            .rounded();
        if totals.subtotal > MAX_AMOUNT || totals.total > MAX_AMOUNT {
            return Err(PricingError::TotalTooLarge);
        }
        Ok(totals)
    }
}

fn is_percent(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= HUNDRED
}

fn has_percent_scale(value: Decimal) -> bool {
    value.normalize().scale() <= PERCENT_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn input(quantity: Decimal, unit_price: Decimal, discount: Decimal) -> LineItemInput {
        LineItemInput {
            item_type: ItemType::Labor,
            part_id: None,
            description: "Brake service".to_string(),
            description_en: None,
            quantity,
            unit_price,
            discount_percent: discount,
        }
    }

    #[test]
    fn test_workshop_scenario() {
        let items = PricingService::price_items(&[input(dec!(2), dec!(100), dec!(0))]).unwrap();
        let totals =
            PricingService::recompute(&items, Percentages::new(Some(dec!(10)), None)).unwrap();

        assert_eq!(totals.subtotal, dec!(200));
        assert_eq!(totals.discount_amount, dec!(20));
        assert_eq!(totals.taxable(), dec!(180));
        assert_eq!(totals.tax_amount, dec!(25.20));
        assert_eq!(totals.total, dec!(205.20));
    }

    #[test]
    fn test_empty_items_give_zero_totals() {
        let totals = PricingService::compute_totals(&[], Percentages::default());
        assert_eq!(totals, Some(Totals::zero()));
    }

    #[test]
    fn test_default_tax_is_fourteen_percent() {
        assert_eq!(Percentages::default().tax_percent, dec!(14));
        assert_eq!(Percentages::default().discount_percent, dec!(0));
    }

    #[test]
    fn test_explicit_zero_tax_is_kept() {
        assert_eq!(Percentages::new(None, Some(dec!(0))).tax_percent, dec!(0));
    }

    #[rstest]
    #[case(dec!(3), dec!(33.33), dec!(0), dec!(99.99))]
    #[case(dec!(1.5), dec!(120), dec!(0), dec!(180))]
    #[case(dec!(1), dec!(99.99), dec!(15), dec!(84.99))]
    #[case(dec!(4), dec!(0), dec!(0), dec!(0))]
    #[case(dec!(1), dec!(50), dec!(100), dec!(0))]
    fn test_line_totals(
        #[case] quantity: Decimal,
        #[case] price: Decimal,
        #[case] discount: Decimal,
        #[case] expected: Decimal,
    ) {
        let items = PricingService::price_items(&[input(quantity, price, discount)]).unwrap();
        assert_eq!(items[0].total, expected);
    }

    #[test]
    fn test_items_keep_submission_order() {
        let items = PricingService::price_items(&[
            input(dec!(1), dec!(10), dec!(0)),
            input(dec!(1), dec!(20), dec!(0)),
        ])
        .unwrap();
        assert_eq!(items[0].sort_order, 0);
        assert_eq!(items[1].sort_order, 1);
        assert_ne!(items[0].id, items[1].id);
    }

    #[rstest]
    #[case(input(dec!(0), dec!(10), dec!(0)), PricingError::NonPositiveQuantity(dec!(0)))]
    #[case(input(dec!(-1), dec!(10), dec!(0)), PricingError::NonPositiveQuantity(dec!(-1)))]
    #[case(input(dec!(1), dec!(-10), dec!(0)), PricingError::NegativeUnitPrice(dec!(-10)))]
    #[case(input(dec!(1), dec!(10), dec!(101)), PricingError::LineDiscountOutOfRange(dec!(101)))]
    #[case(input(dec!(1), dec!(10), dec!(-5)), PricingError::LineDiscountOutOfRange(dec!(-5)))]
    #[case(input(dec!(100), dec!(0.004), dec!(0)), PricingError::UnitPriceNotStorable(dec!(0.004)))]
    #[case(input(dec!(1.0005), dec!(10), dec!(0)), PricingError::QuantityNotStorable(dec!(1.0005)))]
    #[case(input(dec!(1), dec!(10), dec!(12.125)), PricingError::PercentPrecision(dec!(12.125)))]
    fn test_invalid_items(#[case] item: LineItemInput, #[case] expected: PricingError) {
        assert_eq!(PricingService::validate_item(&item), Err(expected));
    }

    #[test]
    fn test_part_line_requires_part() {
        let mut item = input(dec!(1), dec!(10), dec!(0));
        item.item_type = ItemType::Part;
        assert_eq!(
            PricingService::validate_item(&item),
            Err(PricingError::MissingPart)
        );
    }

    #[test]
    fn test_blank_description_rejected() {
        let mut item = input(dec!(1), dec!(10), dec!(0));
        item.description = "  ".to_string();
        assert_eq!(
            PricingService::validate_item(&item),
            Err(PricingError::MissingDescription)
        );
    }

    #[test]
    fn test_percentages_out_of_range() {
        assert_eq!(
            PricingService::validate_percentages(Percentages::new(Some(dec!(120)), None)),
            Err(PricingError::DiscountOutOfRange(dec!(120)))
        );
        assert_eq!(
            PricingService::validate_percentages(Percentages::new(None, Some(dec!(-1)))),
            Err(PricingError::TaxOutOfRange(dec!(-1)))
        );
    }

    #[test]
    fn test_one_bad_item_rejects_all() {
        let result = PricingService::price_items(&[
            input(dec!(1), dec!(10), dec!(0)),
            input(dec!(0), dec!(10), dec!(0)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_huge_quantity_is_rejected_not_panicking() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let result = PricingService::price_items(&[input(huge, dec!(10), dec!(0))]);
        assert_eq!(result, Err(PricingError::QuantityNotStorable(huge)));
        assert_eq!(PricingService::line_total(huge, dec!(10), dec!(0)), None);
    }

    #[test]
    fn test_line_total_past_column_maximum_rejected() {
        let result = PricingService::price_items(&[input(
            dec!(999999999.999),
            dec!(999999999999.99),
            dec!(0),
        )]);
        assert_eq!(result, Err(PricingError::TotalTooLarge));
    }

    #[test]
    fn test_document_total_past_column_maximum_rejected() {
        let line = input(dec!(1), dec!(900000000000), dec!(0));
        let items = PricingService::price_items(&[line.clone(), line]).unwrap();
        assert_eq!(
            PricingService::recompute(&items, Percentages::new(None, Some(dec!(0)))),
            Err(PricingError::TotalTooLarge)
        );
    }

    #[test]
    fn test_totals_from_subtotal_overflow_is_none() {
        let pct = Percentages::new(Some(dec!(10)), Some(dec!(14)));
        assert_eq!(PricingService::totals_from_subtotal(Decimal::MAX, pct), None);
    }

    #[test]
    fn test_fractional_tax_scale_checked() {
        assert_eq!(
            PricingService::validate_percentages(Percentages::new(None, Some(dec!(14.001)))),
            Err(PricingError::PercentPrecision(dec!(14.001)))
        );
        assert!(PricingService::validate_percentages(Percentages::new(None, Some(dec!(14.50))))
            .is_ok());
    }

    /// Totals recomputed from the stored column precision equal the
    /// totals computed at creation.
    #[rstest]
    #[case(dec!(100), dec!(0.40), dec!(0))]
    #[case(dec!(1.125), dec!(33.33), dec!(12.5))]
    #[case(dec!(2.500), dec!(19.90), dec!(0))]
    #[case(dec!(0.001), dec!(999999999999.99), dec!(99.99))]
    fn test_stored_precision_recomputes_equal(
        #[case] quantity: Decimal,
        #[case] price: Decimal,
        #[case] discount: Decimal,
    ) {
        let pct = Percentages::new(Some(dec!(7.5)), Some(dec!(14)));
        let items = PricingService::price_items(&[input(quantity, price, discount)]).unwrap();
        let created = PricingService::recompute(&items, pct).unwrap();

        let stored: Vec<LineItem> = items
            .iter()
            .map(|item| LineItem {
                quantity: item.quantity.round_dp(QUANTITY_SCALE),
                unit_price: item.unit_price.round_dp(2),
                discount_percent: item.discount_percent.round_dp(PERCENT_SCALE),
                total: item.total.round_dp(2),
                ..item.clone()
            })
            .collect();
        let repriced = PricingService::line_total(
            stored[0].quantity,
            stored[0].unit_price,
            stored[0].discount_percent,
        )
        .map(round_currency);
        assert_eq!(repriced, Some(items[0].total));
        assert_eq!(PricingService::recompute(&stored, pct).unwrap(), created);
    }
}
