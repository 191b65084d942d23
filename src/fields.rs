//! Quote-aware splitting of a single decoded line.
//!
//! The parser keeps one bit of state: whether it is inside a double-quoted
//! span. Every `"` flips that bit and is dropped; there is no doubled-quote
//! escape. An unbalanced quote leaves the rest of the line inside the span,
//! which merges the remaining fields into one. No error is raised for that.

pub const DELIMITER: char = ',';
pub const QUOTE: char = '"';

pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => fields.push(finish_field(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(finish_field(&mut current));
    fields
}

fn finish_field(current: &mut String) -> String {
    let field = std::mem::take(current);
    strip_outer_quotes(field.trim()).to_string()
}

/// Removes surrounding whitespace and then any run of enclosing quote characters.
fn strip_outer_quotes(value: &str) -> &str {
    value.trim_matches(QUOTE)
}

/// Naive byte split used by the salvage path, where text may not decode at all.
pub fn split_bytes(line: &[u8]) -> Vec<&[u8]> {
    line.split(|&b| b == DELIMITER as u8).collect()
}

/// Joins fields back into a line, quoting every field that contains a delimiter.
pub fn join_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| {
            let field = field.as_ref();
            if field.contains(DELIMITER) {
                format!("{QUOTE}{field}{QUOTE}")
            } else {
                field.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
