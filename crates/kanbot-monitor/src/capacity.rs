//! Capacity parsing — a list encodes its card limit as a trailing
//! parenthesized integer in its name, e.g. "Doing (5)".

use regex::Regex;
use std::sync::OnceLock;

fn capacity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d+)\)$").expect("capacity regex"))
}

/// Parse the capacity encoded in a list name.
///
/// Only a parenthesized integer at the very end of the name counts. Anything
/// else — no suffix, non-numeric parens, a group in the middle — yields 0,
/// which means "no capacity constraint": the list is exempt from overflow
/// checks.
pub fn parse_capacity(list_name: &str) -> u32 {
    capacity_re()
        .captures(list_name)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}
