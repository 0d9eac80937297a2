//! Scenario categories

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scenario category
///
/// Each kind owns one manifest section, named after the kind's plural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Story or challenge mission
    Mission,
    /// Quest chain
    Quest,
    /// Farming or travel run
    Run,
    /// Area vanquish
    Vanquish,
}

impl ScenarioKind {
    /// All kinds in manifest order
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Mission,
        ScenarioKind::Quest,
        ScenarioKind::Run,
        ScenarioKind::Vanquish,
    ];

    /// Lowercase name as written in scenario files
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScenarioKind::Mission => "mission",
            ScenarioKind::Quest => "quest",
            ScenarioKind::Run => "run",
            ScenarioKind::Vanquish => "vanquish",
        }
    }

    /// Manifest section holding this kind's entries
    #[inline]
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            ScenarioKind::Mission => "missions",
            ScenarioKind::Quest => "quests",
            ScenarioKind::Run => "runs",
            ScenarioKind::Vanquish => "vanquishes",
        }
    }

    /// Kind owning the named manifest section
    #[must_use]
    pub fn from_section(section: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.section_name() == section)
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == text)
            .ok_or_else(|| FormatError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" Mission ".parse::<ScenarioKind>().unwrap(), ScenarioKind::Mission);
        assert_eq!("VANQUISH".parse::<ScenarioKind>().unwrap(), ScenarioKind::Vanquish);
        assert!("dungeon".parse::<ScenarioKind>().is_err());
    }

    #[test]
    fn section_names() {
        assert_eq!(ScenarioKind::from_section("vanquishes"), Some(ScenarioKind::Vanquish));
        assert_eq!(ScenarioKind::from_section("runs"), Some(ScenarioKind::Run));
        assert_eq!(ScenarioKind::from_section("run"), None);
    }
}
