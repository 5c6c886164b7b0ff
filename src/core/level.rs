//! Severity levels
//!
//! Levels follow syslog numbering: the most severe level has the lowest
//! ordinal. `Level::Emergency < Level::Debug` therefore holds, and "at least
//! as severe as" means "ordinal less than or equal to".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 8] = [
        Level::Emergency,
        Level::Alert,
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Emergency => "emergency",
            Level::Alert => "alert",
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Notice => "notice",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Syslog ordinal (0 = emergency, 7 = debug).
    #[inline]
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// True if `self` is as severe as `other` or more severe.
    #[inline]
    pub fn is_at_least(&self, other: Level) -> bool {
        self.ordinal() <= other.ordinal()
    }

    /// Build a level from its syslog ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Emergency | Level::Alert | Level::Critical | Level::Error => Red,
            Level::Warning => Yellow,
            Level::Notice | Level::Info | Level::Debug => Cyan,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "emergency" | "emerg" => Ok(Level::Emergency),
            "alert" => Ok(Level::Alert),
            "critical" | "crit" => Ok(Level::Critical),
            "error" | "err" => Ok(Level::Error),
            "warning" | "warn" => Ok(Level::Warning),
            "notice" => Ok(Level::Notice),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syslog_ordering() {
        assert!(Level::Emergency < Level::Alert);
        assert!(Level::Warning < Level::Debug);
        assert_eq!(Level::Emergency.ordinal(), 0);
        assert_eq!(Level::Debug.ordinal(), 7);
    }

    #[test]
    fn test_is_at_least() {
        assert!(Level::Error.is_at_least(Level::Warning));
        assert!(Level::Warning.is_at_least(Level::Warning));
        assert!(!Level::Info.is_at_least(Level::Warning));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("crit".parse::<Level>().unwrap(), Level::Critical);
        assert_eq!("Emerg".parse::<Level>().unwrap(), Level::Emergency);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_from_ordinal() {
        for level in Level::ALL {
            assert_eq!(Level::from_ordinal(level.ordinal()), Some(level));
        }
        assert_eq!(Level::from_ordinal(8), None);
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:<8}|", Level::Info), "info    |");
    }
}
