//! Numeric sanitizing of request fields.
//!
//! Routing fields (`page`, `page2`, record ids) arrive as arbitrary user
//! text. They are reduced to an integer before anything else looks at them,
//! so markup or script smuggled into those fields never reaches a page.

/// Interpret the leading decimal integer of `raw`.
///
/// Leading ASCII whitespace and a single sign are accepted, parsing stops at
/// the first non-digit. Input without digits yields 0. Values outside the
/// `i64` range saturate.
pub fn sanitize_digit(raw: &str) -> i64 {
    let trimmed = raw.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        // Accumulate toward the sign so i64::MIN stays representable
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        });
        match next {
            Some(v) => value = v,
            None => return if negative { i64::MIN } else { i64::MAX },
        }
    }
    value
}

/// Sanitize an optional field, absent fields read as 0.
pub fn sanitize_field(raw: Option<&str>) -> i64 {
    raw.map(sanitize_digit).unwrap_or(0)
}

/// Loose "flag == 1" check used for `login` / `logout`.
pub fn flag_is_set(raw: Option<&str>) -> bool {
    sanitize_field(raw) == 1
}
