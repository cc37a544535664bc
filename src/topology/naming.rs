//! Resource names and DNS labels.

use regex::Regex;
use std::error::Error;
use std::sync::OnceLock;

/// OCI caps DNS labels at 15 characters.
pub const MAX_DNS_LABEL_LEN: usize = 15;

/// Anything that may not appear in a DNS label.
static DNS_INVALID_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_dns_invalid_regex() -> &'static Regex {
    DNS_INVALID_REGEX.get_or_init(|| Regex::new(r"[^a-z0-9]").expect("Invalid Regex"))
}

/// Name of a declared resource: `{stack}-{name}-{suffix}`, lower-cased.
pub fn resource_name(stack_name: &str, name: &str, suffix: &str) -> String {
    format!("{stack_name}-{name}-{suffix}").to_lowercase()
}

/// Build a DNS label from a base name and a suffix.
///
/// The label is lowercase alphanumeric, starts with a letter and fits in
/// [`MAX_DNS_LABEL_LEN`]. The name is shortened before the suffix is, so
/// labels that differ only by suffix stay distinct.
///
/// # Examples
/// ```
/// use vcn_subnet_planner::topology::dns_label;
/// assert_eq!(dns_label("oke-infra", "puba").unwrap(), "okeinfrapuba");
/// ```
pub fn dns_label(name: &str, suffix: &str) -> Result<String, Box<dyn Error>> {
    let clean = |s: &str| {
        get_dns_invalid_regex()
            .replace_all(&s.to_lowercase(), "")
            .into_owned()
    };
    let name = clean(name);
    let suffix = clean(suffix);

    let name = name.trim_start_matches(|c: char| c.is_ascii_digit());
    let room = MAX_DNS_LABEL_LEN.saturating_sub(suffix.len());
    let label: String = name
        .chars()
        .take(room)
        .chain(suffix.chars())
        .take(MAX_DNS_LABEL_LEN)
        .collect();

    match label.chars().next() {
        None => Err(format!("Empty DNS label from name='{name}' suffix='{suffix}'").into()),
        Some(c) if !c.is_ascii_lowercase() => {
            Err(format!("DNS label '{label}' must start with a letter").into())
        }
        Some(_) => Ok(label),
    }
}
