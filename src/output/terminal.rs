//! Terminal output utilities.

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    if quoted.len() >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}
