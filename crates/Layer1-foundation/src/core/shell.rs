//! Shell selection for command execution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Shells a command task may run under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellType {
    /// Bash (default)
    #[default]
    Bash,
    /// POSIX sh
    Sh,
    /// Zsh
    Zsh,
}

impl ShellType {
    /// Every accepted shell, in schema order
    pub const ALL: [ShellType; 3] = [ShellType::Bash, ShellType::Sh, ShellType::Zsh];

    /// Shell executable name
    pub fn executable(&self) -> &'static str {
        match self {
            ShellType::Bash => "bash",
            ShellType::Sh => "sh",
            ShellType::Zsh => "zsh",
        }
    }

    /// Arguments placed before the command text
    pub fn exec_args(&self) -> Vec<&'static str> {
        vec!["-c"]
    }

    /// Names for a JSON schema `enum`
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.executable()).collect()
    }
}

impl FromStr for ShellType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bash" => Ok(ShellType::Bash),
            "sh" => Ok(ShellType::Sh),
            "zsh" => Ok(ShellType::Zsh),
            other => Err(Error::Validation(format!(
                "Unsupported shell: {} (expected one of {})",
                other,
                Self::names().join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for ShellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.executable())
    }
}
