//! Native value amounts
//!
//! Amounts are integers in base units; one whole unit is `10^DECIMALS`
//! base units. All arithmetic is exact.

use thiserror::Error;

pub type Amount = u128;

pub const DECIMALS: u32 = 18;
pub const UNIT: Amount = 1_000_000_000_000_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Too many decimal places: at most {max} allowed")]
    TooPrecise { max: u32 },

    #[error("Amount overflow")]
    Overflow,
}

/// Render base units as a decimal string, e.g. `500000000000000000` -> `"0.5"`.
pub fn format_units(amount: Amount) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return format!("{}.0", whole);
    }

    let digits = format!("{:0width$}", frac, width = DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse a decimal string such as `"1.25"` into base units.
pub fn parse_units(input: &str) -> Result<Amount, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Invalid("empty string".to_string()));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Invalid(input.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(AmountError::Invalid(input.to_string()));
    }
    if frac.len() > DECIMALS as usize {
        return Err(AmountError::TooPrecise { max: DECIMALS });
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };

    let frac_value: Amount = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
        padded.parse().map_err(|_| AmountError::Overflow)?
    };

    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or(AmountError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(0), "0.0");
        assert_eq!(format_units(UNIT), "1.0");
        assert_eq!(format_units(UNIT / 2), "0.5");
        assert_eq!(format_units(UNIT / 100), "0.01");
        assert_eq!(format_units(3 * UNIT + 1), "3.000000000000000001");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1").unwrap(), UNIT);
        assert_eq!(parse_units("0.5").unwrap(), UNIT / 2);
        assert_eq!(parse_units(".25").unwrap(), UNIT / 4);
        assert_eq!(parse_units("0.01").unwrap(), UNIT / 100);
        assert_eq!(parse_units(" 2.0 ").unwrap(), 2 * UNIT);
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert!(parse_units("").is_err());
        assert!(parse_units(".").is_err());
        assert!(parse_units("-1").is_err());
        assert!(parse_units("1.2.3").is_err());
        assert_eq!(
            parse_units("0.0000000000000000001"),
            Err(AmountError::TooPrecise { max: DECIMALS })
        );
    }
}
