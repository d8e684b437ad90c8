//! Backend workflow selection

use lila_config::StartupMode;
use std::fmt;
use std::str::FromStr;

/// The workflow used for the current and following turns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Streaming retail assistant
    #[default]
    Retail,
    /// Batch HomePort document analysis
    Homeport,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Retail => "retail",
            Mode::Homeport => "homeport",
        }
    }

    /// Human-readable name for menus and status lines
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Retail => "Retail Channel",
            Mode::Homeport => "HomePort Qualification",
        }
    }

    /// Input prompt hint
    pub fn placeholder(&self) -> &'static str {
        match self {
            Mode::Retail => "Ask About Retail Channel...",
            Mode::Homeport => "Ask About HomePort Qualification...",
        }
    }

    /// Analysis turns cannot be submitted without a file
    pub fn requires_attachment(&self) -> bool {
        matches!(self, Mode::Homeport)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retail" => Ok(Mode::Retail),
            "homeport" | "home-port" => Ok(Mode::Homeport),
            other => Err(format!("unknown mode '{}' (expected retail or homeport)", other)),
        }
    }
}

impl From<StartupMode> for Mode {
    fn from(mode: StartupMode) -> Self {
        match mode {
            StartupMode::Retail => Mode::Retail,
            StartupMode::Homeport => Mode::Homeport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("retail".parse::<Mode>().unwrap(), Mode::Retail);
        assert_eq!(" HomePort ".parse::<Mode>().unwrap(), Mode::Homeport);
        assert!("wholesale".parse::<Mode>().is_err());
    }

    #[test]
    fn test_only_homeport_requires_attachment() {
        assert!(Mode::Homeport.requires_attachment());
        assert!(!Mode::Retail.requires_attachment());
    }
}
