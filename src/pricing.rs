//! Size-dependent unit pricing.
//!
//! Sized goods charge a fixed surcharge per garment size over the base
//! price; every money amount shown to the customer is rounded to cents with
//! half-up rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Garment sizes, smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Size {
    S,
    M,
    L,
    XL,
    XXL,
}

impl Size {
    pub const ALL: [Size; 5] = [Size::S, Size::M, Size::L, Size::XL, Size::XXL];

    /// Surcharge added to the base price for this size.
    pub fn offset(self) -> Decimal {
        let units: i64 = match self {
            Size::S => 0,
            Size::M => 5,
            Size::L => 10,
            Size::XL => 15,
            Size::XXL => 20,
        };
        Decimal::from(units)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::XL => "XL",
            Size::XXL => "XXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Size::S),
            "M" => Ok(Size::M),
            "L" => Ok(Size::L),
            "XL" => Ok(Size::XL),
            "XXL" => Ok(Size::XXL),
            other => Err(format!("unknown size: {other}")),
        }
    }
}

/// Round to cents, half-up.
pub fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Unit price for a catalog item: base plus the size surcharge (when any),
/// rounded to cents.
pub fn unit_price(base: Decimal, size: Option<Size>) -> Decimal {
    round_to_cents(base + size.map(Size::offset).unwrap_or(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn size_offsets() {
        assert_eq!(Size::S.offset(), dec!(0));
        assert_eq!(Size::M.offset(), dec!(5));
        assert_eq!(Size::L.offset(), dec!(10));
        assert_eq!(Size::XL.offset(), dec!(15));
        assert_eq!(Size::XXL.offset(), dec!(20));
    }

    #[test]
    fn unit_price_applies_surcharge() {
        assert_eq!(unit_price(dec!(100.00), Some(Size::L)), dec!(110.00));
        assert_eq!(unit_price(dec!(100.00), None), dec!(100.00));
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_to_cents(dec!(10.005)), dec!(10.01));
        assert_eq!(round_to_cents(dec!(10.004)), dec!(10.00));
        assert_eq!(unit_price(dec!(19.995), Some(Size::S)), dec!(20.00));
    }

    #[test]
    fn quantity_multiplies_the_rounded_unit_price() {
        let unit = unit_price(dec!(100.00), Some(Size::L));
        assert_eq!(unit * Decimal::from(2u32), dec!(220.00));
    }

    #[test]
    fn size_parse_is_case_insensitive() {
        assert_eq!("m".parse::<Size>().unwrap(), Size::M);
        assert_eq!("XXL".parse::<Size>().unwrap(), Size::XXL);
        assert!("XS".parse::<Size>().is_err());
    }
}
