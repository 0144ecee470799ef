//! Numeric literal value parsing.
//!
//! The lexer only needs to *recognize* a numeric literal (see
//! `lexer::scan_numeric_literal`); turning its text into an actual value is
//! needed later by the checker (constant folding of array lengths, `cast`
//! narrowing checks) and the post-parser (generic array-length arguments).
//! Grounded in `tsz-common::numeric::parse_numeric_literal_value`, trimmed
//! to the literal grammar this language actually defines: no `0b`/`0o`
//! prefixes, no `_` separators.

/// Parse `[0-9]+` or `0x[0-9a-fA-F]+` text into an unsigned integer value.
#[must_use]
pub fn parse_integer_value(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    text.parse::<u64>().ok()
}

/// Parse `[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?` text into a float value.
#[must_use]
pub fn parse_float_value(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_integer_value("123"), Some(123));
        assert_eq!(parse_integer_value("0xFF"), Some(255));
        assert_eq!(parse_integer_value("0x0"), Some(0));
    }

    #[test]
    fn parses_float_with_exponent() {
        assert_eq!(parse_float_value("1.5"), Some(1.5));
        assert_eq!(parse_float_value("1.5e10"), Some(1.5e10));
        assert_eq!(parse_float_value("1.5e-3"), Some(1.5e-3));
    }
}
