//! Text primitives used to neutralise user-supplied values before they are
//! forwarded to the spreadsheet.

/// Characters stripped from both ends of a value: space, tab, newline,
/// carriage return, NUL and vertical tab.
const TRIM_CHARS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Whitespace accepted before the digits of a numeric string.
const LEADING_NUMERIC_WS: [char; 6] = [' ', '\t', '\n', '\r', '\x0B', '\x0C'];

/// Trims surrounding whitespace (including NUL and vertical tab).
pub fn trim(value: &str) -> &str {
    value.trim_matches(&TRIM_CHARS[..])
}

/// Escapes `&`, `"`, `'`, `<` and `>` as HTML entities.
///
/// Already-escaped entities are escaped again (`&amp;` becomes `&amp;amp;`).
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Trim, then escape.
pub fn sanitize_text(value: &str) -> String {
    escape_html(trim(value))
}

/// Coerces a string to an integer using its leading numeric prefix.
///
/// Leading whitespace is skipped; anything after the numeric prefix is
/// ignored. Decimal and exponent forms are truncated toward zero. A value
/// with no numeric prefix coerces to `0`; out-of-range integers saturate.
pub fn coerce_int(value: &str) -> i64 {
    let s = value.trim_start_matches(&LEADING_NUMERIC_WS[..]);
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut end = 0;
    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut is_float = false;
    let mut frac_digits = 0;
    if end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = j - end - 1;
        if int_digits > 0 || frac_digits > 0 {
            end = j;
            is_float = true;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
            is_float = true;
        }
    }

    let numeric = &s[..end];
    if is_float {
        // `as` saturates and maps NaN to 0.
        numeric.parse::<f64>().map(|f| f as i64).unwrap_or(0)
    } else {
        numeric.parse::<i64>().unwrap_or(if negative { i64::MIN } else { i64::MAX })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_strips_nul_and_vertical_tab() {
        assert_eq!(trim("\0\x0B  hola \t\r\n"), "hola");
        assert_eq!(trim("   "), "");
    }

    #[test]
    fn escape_html_covers_quotes_and_angle_brackets() {
        assert_eq!(
            escape_html(r#"<a href="x">O'Neil & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#039;Neil &amp; co&lt;/a&gt;"
        );
    }

    #[test]
    fn escape_html_double_encodes_entities() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn sanitize_text_trims_before_escaping() {
        let out = sanitize_text(" <b>x</b> ");
        assert_eq!(out, "&lt;b&gt;x&lt;/b&gt;");
        assert!(!out.contains(['<', '>', '"', '\'']));
    }

    #[test]
    fn coerce_int_plain_and_signed() {
        assert_eq!(coerce_int("42"), 42);
        assert_eq!(coerce_int("-7"), -7);
        assert_eq!(coerce_int("+15"), 15);
    }

    #[test]
    fn coerce_int_non_numeric_is_zero() {
        assert_eq!(coerce_int("abc"), 0);
        assert_eq!(coerce_int(""), 0);
        assert_eq!(coerce_int("-"), 0);
        assert_eq!(coerce_int("."), 0);
    }

    #[test]
    fn coerce_int_uses_leading_prefix() {
        assert_eq!(coerce_int("  42abc"), 42);
        assert_eq!(coerce_int("12 monkeys"), 12);
    }

    #[test]
    fn coerce_int_truncates_decimals_and_exponents() {
        assert_eq!(coerce_int("3.9"), 3);
        assert_eq!(coerce_int("-3.9"), -3);
        assert_eq!(coerce_int(".5"), 0);
        assert_eq!(coerce_int("1e3"), 1000);
        assert_eq!(coerce_int("2e"), 2);
    }

    #[test]
    fn coerce_int_saturates() {
        assert_eq!(coerce_int("99999999999999999999"), i64::MAX);
        assert_eq!(coerce_int("-99999999999999999999"), i64::MIN);
    }
}
