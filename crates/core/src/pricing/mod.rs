//! Storefront calculators. Totals are always derived from the current selection
//! and are never stored on the draft.

pub mod gallery;
pub mod social;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::pricing::gallery::CheckoutStep;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("`{item}` is sold out")]
    SoldOut { item: String },
    #[error("cannot leave the {step:?} step until these fields are filled: {missing:?}")]
    Gated { step: CheckoutStep, missing: Vec<&'static str> },
    #[error("checkout is at the {step:?} step; expected {expected:?}")]
    WrongStep { step: CheckoutStep, expected: CheckoutStep },
    #[error("You must accept the Terms of Service.")]
    TermsNotAccepted,
    #[error("Please provide a link to your profile or post.")]
    MissingTargetLink,
    #[error("Please provide a link/context.")]
    MissingBrief,
    #[error("Service unavailable.")]
    ServiceUnavailable,
    #[error("nothing priced has been selected")]
    EmptySelection,
    #[error("quantity {0} is not one of the offered sizes")]
    QuantityNotOffered(u32),
    #[error("no custom row with id `{0}`")]
    UnknownRow(String),
}

/// Reads the amount out of a display label such as `₦250,000`.
pub fn parse_price_label(label: &str) -> Decimal {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Formats whole naira with thousands separators; fractional kobo keep two places.
pub fn format_naira(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let whole = rounded.trunc().abs().to_u128().unwrap_or(0);
    let kobo = (rounded.fract().abs() * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    if kobo == 0 {
        format!("{sign}₦{grouped}")
    } else {
        format!("{sign}₦{grouped}.{kobo:02}")
    }
}

pub fn order_total(lines: &[(Decimal, u32)]) -> Decimal {
    lines.iter().map(|(unit_price, quantity)| *unit_price * Decimal::from(*quantity)).sum()
}
