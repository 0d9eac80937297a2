//! Symbolic name normalization
//!
//! Shared by manifest key lookup and action alias resolution so both surfaces
//! agree on what "the same name" means.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-_/]+").expect("valid regex"));
static CAMEL_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));
static CAMEL_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// Normalize a symbolic name
///
/// Trims, lowercases and collapses every run of whitespace, `-`, `_` or `/`
/// into a single `.`.
///
/// ```
/// use scn_scenario::names::normalize_token;
/// assert_eq!(normalize_token(" Move_XY "), "move.xy");
/// assert_eq!(normalize_token("wait - for/time"), "wait.for.time");
/// ```
#[must_use]
pub fn normalize_token(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    SEPARATORS.replace_all(&lowered, ".").into_owned()
}

/// Convert a CamelCase identifier to snake_case
///
/// ```
/// use scn_scenario::names::camel_to_snake;
/// assert_eq!(camel_to_snake("FollowAutoPath"), "follow_auto_path");
/// assert_eq!(camel_to_snake("XYAndInteractNPC"), "xy_and_interact_npc");
/// ```
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let first = CAMEL_HEAD.replace_all(name, "${1}_${2}");
    CAMEL_TAIL.replace_all(&first, "${1}_${2}").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_collapses_mixed_separators() {
        assert_eq!(normalize_token("Dialogs_At-XY"), "dialogs.at.xy");
        assert_eq!(normalize_token("map / travel"), "map.travel");
        assert_eq!(normalize_token("Move.XY"), "move.xy");
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(camel_to_snake("UntilOutOfCombat"), "until_out_of_combat");
        assert_eq!(camel_to_snake("ForMapLoad"), "for_map_load");
        assert_eq!(camel_to_snake("XY"), "xy");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[A-Za-z0-9 _./-]{0,24}") {
            let once = normalize_token(&s);
            prop_assert_eq!(normalize_token(&once), once);
        }

        #[test]
        fn normalize_ignores_case(s in "[A-Za-z _-]{0,24}") {
            prop_assert_eq!(normalize_token(&s.to_uppercase()), normalize_token(&s.to_lowercase()));
        }
    }
}
