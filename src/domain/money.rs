use std::fmt;

/// Money is represented as whole rials. All amounts in the system are
/// integers, so there is no fractional unit to lose precision on.
pub type Rials = i64;

/// Format rials as a human-readable amount with thousands separators.
/// Example: 1500000 -> "1,500,000", -9500 -> "-9,500"
pub fn format_rials(amount: Rials) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}", sign, grouped)
}

/// Parse a rial amount from user input.
/// Accepts plain digits with optional thousands separators:
/// "150000" -> 150000, "150,000" -> 150000, "1_500_000" -> 1500000
pub fn parse_rials(input: &str) -> Result<Rials, ParseRialsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let digits: String = input.chars().filter(|c| *c != ',' && *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseRialsError::InvalidFormat);
    }

    let amount: Rials = digits.parse().map_err(|_| ParseRialsError::InvalidFormat)?;
    Ok(if negative { -amount } else { amount })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseRialsError {
    InvalidFormat,
}

impl fmt::Display for ParseRialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseRialsError::InvalidFormat => write!(f, "invalid amount format"),
        }
    }
}

impl std::error::Error for ParseRialsError {}
