use thiserror::Error;

/// Amounts are carried as integer minor units (cents); rates as basis points.
/// All percentage math goes through [`apply_rate_bps`] so every figure is
/// rounded half-up exactly once.
const BPS_SCALE: i64 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Applies a basis-point rate to a minor-unit amount, rounding half-up.
pub fn apply_rate_bps(amount_minor: i64, rate_bps: i64) -> i64 {
    (amount_minor * rate_bps + BPS_SCALE / 2) / BPS_SCALE
}

/// Parses a decimal currency string ("100", "100.5", "100.50") into minor units.
pub fn parse_decimal_minor(raw: &str) -> Result<i64, MoneyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MoneyError::InvalidAmount(raw.to_string()));
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(MoneyError::InvalidAmount(raw.to_string()));
    }
    if frac.len() > 2 {
        return Err(MoneyError::InvalidAmount(raw.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidAmount(raw.to_string()));
    }

    let whole_minor = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<i64>()
            .map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?
            .checked_mul(100)
            .ok_or_else(|| MoneyError::InvalidAmount(raw.to_string()))?
    };

    let frac_minor = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().unwrap_or(0) * 10,
        _ => frac.parse::<i64>().unwrap_or(0),
    };

    whole_minor
        .checked_add(frac_minor)
        .ok_or_else(|| MoneyError::InvalidAmount(raw.to_string()))
}

/// Formats minor units back into a two-decimal string ("10000" -> "100.00").
pub fn format_minor(amount_minor: i64) -> String {
    format!("{}.{:02}", amount_minor / 100, amount_minor % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_percent_of_one_hundred_dollars() {
        assert_eq!(apply_rate_bps(10_000, 1_500), 1_500);
    }

    #[test]
    fn five_percent_of_one_hundred_dollars() {
        assert_eq!(apply_rate_bps(10_000, 500), 500);
    }

    #[test]
    fn rounds_half_up() {
        // 0.10 at 5% is exactly half a cent
        assert_eq!(apply_rate_bps(10, 500), 1);
        // 10.05 at 15% = 1.5075 -> 1.51
        assert_eq!(apply_rate_bps(1_005, 1_500), 151);
        // 10.01 at 15% = 1.5015 -> 1.50
        assert_eq!(apply_rate_bps(1_001, 1_500), 150);
    }

    #[test]
    fn zero_amount_yields_zero() {
        assert_eq!(apply_rate_bps(0, 1_500), 0);
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(parse_decimal_minor("100.00"), Ok(10_000));
        assert_eq!(parse_decimal_minor("100.5"), Ok(10_050));
        assert_eq!(parse_decimal_minor("100"), Ok(10_000));
        assert_eq!(parse_decimal_minor("0.99"), Ok(99));
        assert_eq!(parse_decimal_minor(".50"), Ok(50));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!(parse_decimal_minor("").is_err());
        assert!(parse_decimal_minor(".").is_err());
        assert!(parse_decimal_minor("-5").is_err());
        assert!(parse_decimal_minor("1.234").is_err());
        assert!(parse_decimal_minor("12a").is_err());
    }

    #[test]
    fn formats_minor_units() {
        assert_eq!(format_minor(10_000), "100.00");
        assert_eq!(format_minor(1_500), "15.00");
        assert_eq!(format_minor(5), "0.05");
    }

    #[test]
    fn parse_format_agree() {
        assert_eq!(format_minor(parse_decimal_minor("42.07").unwrap()), "42.07");
    }
}
