use core::{fmt, str::FromStr};

use crate::{BigId, error::ParseError};

/// Parses a base-10 signed 64-bit integer into a [`BigId`].
///
/// An optional leading `+` or `-` is accepted; whitespace is not.
///
/// # Errors
///
/// Returns a [`ParseError`] for empty input, non-digit characters, or a value
/// outside the `i64` range.
///
/// # Example
///
/// ```
/// use bigid::parse;
///
/// let id = parse("4611686018427388929").unwrap();
/// assert_eq!(id.version(), 1);
/// assert!(parse("not-a-number").is_err());
/// ```
pub fn parse(text: &str) -> Result<BigId, ParseError> {
    text.parse::<i64>()
        .map(BigId::from_raw)
        .map_err(|e| ParseError::new(text, e))
}

impl BigId {
    /// Decodes a plain textual bind value, such as a path segment or query
    /// parameter, with the same rules as [`parse`].
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn from_bind_value(value: &str) -> Result<Self, ParseError> {
        parse(value)
    }
}

impl FromStr for BigId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Renders the signed value in base 10.
///
/// The rendered form is upper case by contract; decimal digits and `-` have
/// no case, so this is the plain integer text.
impl fmt::Display for BigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_raw(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::IntErrorKind;

    #[test]
    fn render_is_signed_decimal() {
        assert_eq!(BigId::from_raw(0).to_string(), "0");
        assert_eq!(BigId::from_raw(1 << 62).to_string(), "4611686018427387904");
        assert_eq!(BigId::from_u64(u64::MAX).to_string(), "-1");
        assert_eq!(BigId::from_raw(i64::MIN).to_string(), "-9223372036854775808");
    }

    #[test]
    fn render_then_parse_reproduces_id() {
        for raw in [0, 1, -1, 42, i64::MAX, i64::MIN, 0x4000_0000_0FA0_1C01] {
            let id = BigId::from_raw(raw);
            assert_eq!(parse(&id.to_string()), Ok(id));
            assert_eq!(id.to_string().parse::<BigId>(), Ok(id));
        }
    }

    #[test]
    fn parse_accepts_explicit_sign() {
        assert_eq!(parse("+17"), Ok(BigId::from_raw(17)));
        assert_eq!(parse("-17"), Ok(BigId::from_raw(-17)));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let err = parse("not-a-number").unwrap_err();
        assert_eq!(err.kind(), &IntErrorKind::InvalidDigit);
        assert_eq!(err.input(), "not-a-number");
    }

    #[test]
    fn parse_rejects_empty() {
        let err = parse("").unwrap_err();
        assert_eq!(err.kind(), &IntErrorKind::Empty);
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert_eq!(
            parse("9223372036854775808").unwrap_err().kind(),
            &IntErrorKind::PosOverflow
        );
        assert_eq!(
            parse("-9223372036854775809").unwrap_err().kind(),
            &IntErrorKind::NegOverflow
        );
    }

    #[test]
    fn parse_rejects_surrounding_whitespace_and_hex() {
        assert!(parse(" 1").is_err());
        assert!(parse("1 ").is_err());
        assert!(parse("0x10").is_err());
    }

    #[test]
    fn bind_value_uses_parse_rules() {
        assert_eq!(BigId::from_bind_value("123"), Ok(BigId::from_raw(123)));
        assert_eq!(BigId::from_bind_value("abc"), parse("abc"));
    }
}
