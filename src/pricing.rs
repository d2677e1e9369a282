// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use crate::models::{NewQuote, QuoteInput};
use rust_decimal::Decimal;

/// Line total for a quote: tax is applied to the unit price first, the discount to
/// the taxed price, then the result is multiplied by the quantity.
///
/// Rates are percentages. A discount above 100 yields a negative total. Returns
/// `None` when an intermediate step leaves the `Decimal` range.
pub fn checked_total(
    unit_price: Decimal,
    quantity: u64,
    tax_rate: Decimal,
    discount_rate: Decimal,
) -> Option<Decimal> {
    let tax_factor = Decimal::ONE.checked_add(tax_rate.checked_div(Decimal::ONE_HUNDRED)?)?;
    let discount_factor =
        Decimal::ONE.checked_sub(discount_rate.checked_div(Decimal::ONE_HUNDRED)?)?;
    let price_with_tax = unit_price.checked_mul(tax_factor)?;
    let price_with_discount = price_with_tax.checked_mul(discount_factor)?;
    price_with_discount.checked_mul(Decimal::from(quantity))
}

/// [`checked_total`] for inputs that passed [`QuoteInput::validate`]. Out of range
/// results saturate at `Decimal::MAX` or `Decimal::MIN`.
pub fn compute_total(
    unit_price: Decimal,
    quantity: u64,
    tax_rate: Decimal,
    discount_rate: Decimal,
) -> Decimal {
    checked_total(unit_price, quantity, tax_rate, discount_rate).unwrap_or_else(|| {
        let negative = (unit_price < Decimal::ZERO)
            ^ (tax_rate < -Decimal::ONE_HUNDRED)
            ^ (discount_rate > Decimal::ONE_HUNDRED);
        if negative { Decimal::MIN } else { Decimal::MAX }
    })
}

/// Entry rules applied by [`QuoteInput::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub require_product: bool,
    pub max_rate: Option<Decimal>,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            require_product: true,
            max_rate: None,
        }
    }
}

impl QuoteInput {
    pub fn validate(&self, rules: &Rules) -> Result<NewQuote, ValidationError> {
        let supplier = self.supplier.trim();
        if supplier.is_empty() {
            return Err(ValidationError::MissingField("supplier"));
        }
        let product = self.product.trim();
        if rules.require_product && product.is_empty() {
            return Err(ValidationError::MissingField("product"));
        }

        let unit_price = entry_decimal("unit price", &self.unit_price)?;
        let quantity = entry_quantity(&self.quantity)?;
        let tax_rate = entry_decimal("tax rate", &self.tax_rate)?;
        let discount_rate = entry_decimal("discount rate", &self.discount_rate)?;

        if let Some(ceiling) = rules.max_rate {
            for (field, value) in [("tax rate", tax_rate), ("discount rate", discount_rate)] {
                if value > ceiling {
                    return Err(ValidationError::RateAboveCeiling {
                        field,
                        value,
                        ceiling,
                    });
                }
            }
        }

        if checked_total(unit_price, quantity, tax_rate, discount_rate).is_none() {
            return Err(ValidationError::OutOfRange { field: "total" });
        }

        Ok(NewQuote {
            supplier: supplier.to_string(),
            product: product.to_string(),
            description: self.description.trim().to_string(),
            unit_price,
            quantity,
            tax_rate,
            discount_rate,
        })
    }
}

// Both '.' and ',' are accepted as the decimal separator.
fn entry_decimal(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let raw = raw.trim();
    let value = raw
        .replace(',', ".")
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: raw.to_string(),
        })?;
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative { field });
    }
    Ok(value)
}

fn entry_quantity(raw: &str) -> Result<u64, ValidationError> {
    let raw = raw.trim();
    let value = raw
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field: "quantity",
            value: raw.to_string(),
        })?;
    u64::try_from(value).map_err(|_| ValidationError::Negative { field: "quantity" })
}
