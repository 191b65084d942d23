//! Scalar cleanup before values are embedded in SQL text.

use std::borrow::Cow;

/// Doubles every single quote so the value can sit inside a `'...'` literal.
///
/// Not idempotent: escaping an already escaped value doubles the quotes again.
pub fn escape_sql_literal(value: &str) -> Cow<'_, str> {
    if value.contains('\'') {
        Cow::Owned(value.replace('\'', "''"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Deletes every character outside 7-bit ASCII.
///
/// Only for the salvage path, where the result is an opaque distinguishing
/// token. The output may be empty.
pub fn strip_non_ascii(value: &[u8]) -> String {
    value
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect()
}
