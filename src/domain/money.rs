use std::fmt;

/// Money is kept as integer minor units (cents) so that splits reconcile exactly.
/// For EUR/USD, €33.34 = 3334 cents.
pub type Cents = i64;

/// Percentages are kept as integer basis points: 1% = 100, 100% = 10_000.
pub type BasisPoints = i64;

/// One hundred percent, in basis points.
pub const FULL_PERCENTAGE: BasisPoints = 10_000;

/// Format cents as a decimal amount.
/// Example: 3334 -> "33.34", -5 -> "-0.05"
pub fn format_cents(cents: Cents) -> String {
    format_hundredths(cents)
}

/// Format basis points as a decimal percentage without the sign.
/// Example: 3333 -> "33.33", 5000 -> "50.00"
pub fn format_percentage(bp: BasisPoints) -> String {
    format_hundredths(bp)
}

/// Parse a decimal amount such as "12.5" or "100" into cents.
pub fn parse_cents(input: &str) -> Result<Cents, ParseAmountError> {
    parse_hundredths(input)
}

/// Parse a decimal percentage such as "33.33" or "50" into basis points.
/// A trailing `%` is accepted.
pub fn parse_percentage(input: &str) -> Result<BasisPoints, ParseAmountError> {
    parse_hundredths(input.trim().trim_end_matches('%'))
}

fn format_hundredths(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn parse_hundredths(input: &str) -> Result<i64, ParseAmountError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseAmountError::InvalidFormat);
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }
    if fraction.len() > 2 {
        return Err(ParseAmountError::TooPrecise);
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseAmountError::Overflow)?
    };
    // "5" after the point means 50 hundredths
    let hundredths: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| ParseAmountError::InvalidFormat)? * 10,
        _ => fraction.parse().map_err(|_| ParseAmountError::InvalidFormat)?,
    };

    let value = units
        .checked_mul(100)
        .and_then(|v| v.checked_add(hundredths))
        .ok_or(ParseAmountError::Overflow)?;
    Ok(if negative { -value } else { value })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    TooPrecise,
    Overflow,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid number format"),
            ParseAmountError::TooPrecise => write!(f, "at most two decimal places are allowed"),
            ParseAmountError::Overflow => write!(f, "number is too large"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
