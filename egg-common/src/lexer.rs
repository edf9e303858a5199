//! Small text helpers shared by the schema scraper and the command-list compiler.

/// Split off the first whitespace-delimited token.
///
/// Returns the token and everything after it (untrimmed), or `None` if
/// `src` holds only whitespace.
pub fn next_token(src: &str) -> Option<(&str, &str)> {
    let src = src.trim_start();
    if src.is_empty() {
        return None;
    }
    let end = src.find(char::is_whitespace).unwrap_or(src.len());
    Some((&src[..end], &src[end..]))
}

/// Parse an integer literal: decimal, `0x` hex, `0o` octal or `0b` binary,
/// with an optional leading `-`.
pub fn parse_int(src: &str) -> Option<i64> {
    let (negative, body) = match src.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, src),
    };
    let (radix, digits) = match body.get(..2) {
        Some("0x") | Some("0X") => (16, &body[2..]),
        Some("0o") | Some("0O") => (8, &body[2..]),
        Some("0b") | Some("0B") => (2, &body[2..]),
        _ => (10, body),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a non-negative integer that fits in `u32`.
pub fn parse_uint(src: &str) -> Option<u32> {
    if src.starts_with('-') {
        return None;
    }
    parse_int(src).and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_token() {
        assert_eq!(next_token("  abc def"), Some(("abc", " def")));
        assert_eq!(next_token("abc"), Some(("abc", "")));
        assert_eq!(next_token(" \t "), None);
    }

    #[test]
    fn test_parse_int_radixes() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-7"), Some(-7));
        assert_eq!(parse_int("0x2a"), Some(42));
        assert_eq!(parse_int("0X2A"), Some(42));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("0"), Some(0));
    }

    #[test]
    fn test_parse_int_rejects_junk() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("0x-5"), None);
        assert_eq!(parse_int("+5"), None);
        assert_eq!(parse_int("12ab"), None);
        assert_eq!(parse_int("hero"), None);
    }

    #[test]
    fn test_parse_uint() {
        assert_eq!(parse_uint("0x61"), Some(0x61));
        assert_eq!(parse_uint("-1"), None);
        assert_eq!(parse_uint("4294967296"), None);
    }
}
