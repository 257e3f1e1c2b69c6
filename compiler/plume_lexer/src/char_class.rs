//! Character-class predicates driving first-character dispatch.
//!
//! Operator characters count as identifier parts once a scan is inside an
//! identifier: that is what makes symbolic method names such as `+` or
//! `unary_-` spellable. It also means `a<b` without spaces is one
//! identifier, which the grammar accepts on purpose.

/// ASCII letter.
#[inline]
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// ASCII digit.
#[inline]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

/// Horizontal whitespace; newline is significant and excluded.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\x0b' | '\x0c' | '\u{a0}')
}

#[inline]
pub fn is_newline(c: char) -> bool {
    c == '\n'
}

#[inline]
pub fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',')
}

#[inline]
pub fn is_dot(c: char) -> bool {
    c == '.'
}

/// Characters an operator token may start with.
#[inline]
pub fn is_operator(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '=' | '>' | '<' | '!' | '&' | '|' | '%' | '~' | '$' | '^'
    )
}

/// Valid inside an identifier: letters, digits, underscore and operator
/// characters.
#[inline]
pub fn is_identifier_part(c: char) -> bool {
    c == '_' || is_letter_or_digit(c) || is_operator(c)
}

#[inline]
pub fn is_identifier_start(c: char) -> bool {
    is_letter(c) || c == '_'
}

/// A number may start with a digit or a leading decimal dot.
#[inline]
pub fn is_number_start(c: char) -> bool {
    is_digit(c) || c == '.'
}

#[inline]
pub fn is_string_delimiter(c: char) -> bool {
    c == '"'
}

#[inline]
pub fn is_exponent_symbol(c: char) -> bool {
    c == 'e' || c == 'E'
}

#[inline]
pub fn is_escape_character(c: char) -> bool {
    c == '\\'
}

/// Characters that may close an escape sequence.
#[inline]
pub fn is_end_of_escape_sequence(c: char) -> bool {
    matches!(c, '"' | '\\' | 'n' | 'r' | 't' | 'b' | 'f' | 'v' | '0')
}

/// First characters of identifier, keyword, number or string literals.
#[inline]
pub fn is_literal_start(c: char) -> bool {
    is_identifier_start(c) || is_number_start(c) || is_string_delimiter(c)
}
