//! Numeric coercion for captured and manually entered values.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a lab value such as `"4.2"`, `"4,2"` or `"38."`.
///
/// Either `.` or `,` is accepted as the decimal separator. Strings with more
/// than one separator, letters, or values outside the decimal range give `None`.
pub fn parse_lab_number(s: &str) -> Option<Decimal> {
    let trimmed = s.trim().trim_end_matches(['.', ',']);
    if trimmed.is_empty() {
        return None;
    }

    let separators = trimmed.chars().filter(|c| *c == '.' || *c == ',').count();
    if separators > 1 {
        return None;
    }

    let unsigned = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    if unsigned.is_empty()
        || !unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    Decimal::from_str(&trimmed.replace(',', ".")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lab_number() {
        assert_eq!(parse_lab_number("4.2"), Some(Decimal::new(42, 1)));
        assert_eq!(parse_lab_number("4,2"), Some(Decimal::new(42, 1)));
        assert_eq!(parse_lab_number(" 38 "), Some(Decimal::from(38)));
        assert_eq!(parse_lab_number("38."), Some(Decimal::from(38)));
        assert_eq!(parse_lab_number("-3"), Some(Decimal::from(-3)));
    }

    #[test]
    fn test_parse_lab_number_rejects_malformed() {
        assert_eq!(parse_lab_number(""), None);
        assert_eq!(parse_lab_number("4.2.1"), None);
        assert_eq!(parse_lab_number("1,234.5"), None);
        assert_eq!(parse_lab_number("abc"), None);
        assert_eq!(parse_lab_number("nan"), None);
        assert_eq!(parse_lab_number("12 mg"), None);
        assert_eq!(parse_lab_number("-"), None);
        assert_eq!(parse_lab_number("99999999999999999999999999999999"), None);
    }
}
