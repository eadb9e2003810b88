//! Regular-expression escaping helpers
//!
//! Literal glob characters must be neutralised before they are embedded in
//! the generated expression. Because the expression runs with Unicode mode
//! disabled, characters outside printable ASCII are rendered as the escaped
//! bytes of their UTF-8 encoding; a bare non-ASCII literal would be rejected
//! by the backend in that mode.

/// Escapes a character for use in the body of a regular expression.
pub(crate) fn escape(ch: char) -> String {
    match ch {
        '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' => {
            format!("\\{ch}")
        }
        other => escape_non_printable(other),
    }
}

/// Escapes a character for use inside a regular-expression character class.
///
/// A multi-byte character cannot be expressed as a byte sequence inside a
/// class, so it is kept as a code-point escape; compiling it in non-Unicode
/// mode then surfaces as a regular-expression error.
pub(crate) fn escape_char_class(ch: char) -> String {
    match ch {
        '^' | '[' | ']' => format!("\\{ch}"),
        other => {
            let code = other as u32;
            if (0x20..=0x7e).contains(&code) {
                other.to_string()
            } else if code < 0x80 {
                format!("\\x{code:02x}")
            } else {
                format!("\\u{{{code:04x}}}")
            }
        }
    }
}

fn escape_non_printable(ch: char) -> String {
    let code = ch as u32;
    if (0x20..=0x7e).contains(&code) {
        ch.to_string()
    } else {
        let mut buffer = [0u8; 4];
        let mut escaped = String::new();
        for byte in ch.encode_utf8(&mut buffer).as_bytes() {
            escaped.push_str(&format!("\\x{byte:02x}"));
        }
        escaped
    }
}
