//! Group label normalization
//!
//! Turns a partition key into a clean display string. Key components are first
//! converted to their canonical form, then each component is cleaned:
//!
//! 1. a library namespace such as `np.` is dropped, and a wrapper like
//!    `np.float64(0.5)` is reduced to `0.5`
//! 2. underscores are removed
//! 3. parentheses are removed
//! 4. surrounding quotes and whitespace are stripped
//!
//! Composite keys are joined with `", "`. Commas are kept so the component
//! boundary stays visible.

use crate::table::GroupKey;

/// Separator between composite key components
pub const COMPONENT_SEPARATOR: &str = ", ";

const LIBRARY_PREFIXES: [&str; 4] = ["np.", "numpy.", "pd.", "pandas."];

/// Normalize a partition key into a display label
pub fn normalize_key(key: &GroupKey) -> String {
    normalize_label(&key.parts().join(COMPONENT_SEPARATOR))
}

/// Normalize an already-rendered label. `normalize_label(normalize_label(x)) == normalize_label(x)`.
pub fn normalize_label(raw: &str) -> String {
    raw.split(',')
        .map(clean_component)
        .collect::<Vec<_>>()
        .join(COMPONENT_SEPARATOR)
}

/// Clean one component until it stops changing. Every pass only removes
/// characters, so this terminates.
fn clean_component(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
    strip_library_prefix(trimmed)
        .chars()
        .filter(|c| !matches!(c, '_' | '(' | ')'))
        .collect::<String>()
        .trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace())
        .to_string()
}

/// `np.True_` -> `True_`, `np.int64(3` -> `3`; anything else is returned unchanged
fn strip_library_prefix(raw: &str) -> &str {
    let Some(rest) = LIBRARY_PREFIXES
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
    else {
        return raw;
    };
    match rest.find('(') {
        Some(open)
            if rest[..open]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            rest[open + 1..].trim_end_matches(')')
        }
        _ => rest,
    }
}
