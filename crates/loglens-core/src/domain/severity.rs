//! Android log priorities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Android log priority, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "V")]
    Verbose,
    #[serde(rename = "D")]
    Debug,
    #[serde(rename = "I")]
    Info,
    #[serde(rename = "W")]
    Warn,
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "F")]
    Fatal,
    #[serde(rename = "S")]
    Silent,
}

impl Severity {
    /// Single-letter form used by logcat output and filter specs.
    pub const fn letter(self) -> char {
        match self {
            Self::Verbose => 'V',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
            Self::Fatal => 'F',
            Self::Silent => 'S',
        }
    }

    /// Parse a logcat priority letter. `A` (assert) is reported as `Fatal`.
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'V' => Some(Self::Verbose),
            'D' => Some(Self::Debug),
            'I' => Some(Self::Info),
            'W' => Some(Self::Warn),
            'E' => Some(Self::Error),
            'F' | 'A' => Some(Self::Fatal),
            'S' => Some(Self::Silent),
            _ => None,
        }
    }

    /// Normalize a user supplied level name ("verbose", "Warn", "e", "assert")
    /// by its first letter. Anything unrecognized falls back to `Verbose`.
    pub fn from_level_name(level: &str) -> Self {
        let first = level.trim().chars().next().map(|c| c.to_ascii_lowercase());
        match first {
            Some('d') => Self::Debug,
            Some('i') => Self::Info,
            Some('w') => Self::Warn,
            Some('e') => Self::Error,
            Some('f' | 'a') => Self::Fatal,
            Some('s') => Self::Silent,
            _ => Self::Verbose,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_name_normalization() {
        assert_eq!(Severity::from_level_name("verbose"), Severity::Verbose);
        assert_eq!(Severity::from_level_name(" Debug"), Severity::Debug);
        assert_eq!(Severity::from_level_name("info"), Severity::Info);
        assert_eq!(Severity::from_level_name("WARN"), Severity::Warn);
        assert_eq!(Severity::from_level_name("error"), Severity::Error);
        assert_eq!(Severity::from_level_name("assert"), Severity::Fatal);
        assert_eq!(Severity::from_level_name("fatal"), Severity::Fatal);
        assert_eq!(Severity::from_level_name("silent"), Severity::Silent);
        assert_eq!(Severity::from_level_name(""), Severity::Verbose);
        assert_eq!(Severity::from_level_name("bogus"), Severity::Verbose);
    }

    #[test]
    fn test_letter_round_trip() {
        for letter in ['V', 'D', 'I', 'W', 'E', 'F', 'S'] {
            let severity = Severity::from_letter(letter).unwrap();
            assert_eq!(severity.letter(), letter);
        }
        assert_eq!(Severity::from_letter('A'), Some(Severity::Fatal));
        assert_eq!(Severity::from_letter('X'), None);
    }

    #[test]
    fn test_serializes_as_letter() {
        let json = serde_json::to_string(&Severity::Warn).unwrap();
        assert_eq!(json, "\"W\"");
    }
}
