//! Decimal amounts.
//!
//! Provider amounts arrive as decimal strings in token units (not raw units), so they
//! are carried as arbitrary-precision decimals rather than fixed-point integers.

use bigdecimal::{BigDecimal, Zero};

/// A token amount or fee, in whole token units.
pub type Amount = BigDecimal;

/// Sum a sequence of amounts, starting from zero.
pub fn sum_amounts<'a, I>(amounts: I) -> Amount
where
    I: IntoIterator<Item = &'a Amount>,
{
    amounts
        .into_iter()
        .fold(Amount::zero(), |acc, amount| acc + amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn sum_of_nothing_is_zero() {
        assert!(sum_amounts(std::iter::empty()).is_zero());
    }

    #[test]
    fn sum_keeps_decimal_precision() {
        let values = ["0.1", "0.2", "0.000000000000000001"]
            .iter()
            .map(|s| Amount::from_str(s).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            sum_amounts(&values),
            Amount::from_str("0.300000000000000001").unwrap()
        );
    }
}
