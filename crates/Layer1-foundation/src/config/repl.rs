//! Repl Config - server settings
//!
//! Loaded from the global store, then the project store; later sources win.

use crate::core::ShellType;
use crate::storage::json::load_json_file;
use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Config file name inside a store
pub const REPL_CONFIG_FILE: &str = "config.json";

/// Default idle timeout for interpreter sessions
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Default interval between cleanup sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Default interpreter executable
pub const DEFAULT_INTERPRETER: &str = "python3";

// ============================================================================
// Repl Config
// ============================================================================

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplConfig {
    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub shell: ShellSettings,

    #[serde(default)]
    pub python: PythonSettings,
}

impl ReplConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global + project merged load
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<ReplConfig>(REPL_CONFIG_FILE)? {
                debug!("Loaded global config from {}", global.base_dir().display());
                config.merge(global_config);
            }
        }

        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) = project.load_optional::<ReplConfig>(REPL_CONFIG_FILE)? {
                debug!("Loaded project config from {}", project.base_dir().display());
                config.merge(project_config);
            }
        }

        Ok(config)
    }

    /// Load a single explicit file, skipping discovery
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Self::new();
        config.merge(load_json_file(path)?);
        Ok(config)
    }

    /// Copy with every default written out explicitly
    pub fn resolved(&self) -> Self {
        Self {
            session: SessionSettings {
                idle_timeout_secs: Some(self.session.idle_timeout().as_secs()),
                sweep_interval_secs: Some(self.session.sweep_interval().as_secs()),
                interpreter: Some(self.session.interpreter().to_string()),
            },
            shell: ShellSettings {
                default_shell: Some(self.shell.default_shell()),
                default_working_dir: self.shell.default_working_dir.clone(),
            },
            python: PythonSettings {
                executable: Some(self.python.executable().to_string()),
            },
        }
    }

    /// Merge another config into this one (other wins)
    pub fn merge(&mut self, other: ReplConfig) {
        self.session.merge(other.session);
        self.shell.merge(other.shell);
        self.python.merge(other.python);
    }
}

// ============================================================================
// Session Settings
// ============================================================================

/// Interpreter session settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Seconds of inactivity before a session is evicted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,

    /// Seconds between cleanup sweeps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,

    /// Interpreter executable for session workers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
}

impl SessionSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(
            self.sweep_interval_secs
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS)
                .max(1),
        )
    }

    pub fn interpreter(&self) -> &str {
        self.interpreter.as_deref().unwrap_or(DEFAULT_INTERPRETER)
    }

    fn merge(&mut self, other: SessionSettings) {
        if other.idle_timeout_secs.is_some() {
            self.idle_timeout_secs = other.idle_timeout_secs;
        }
        if other.sweep_interval_secs.is_some() {
            self.sweep_interval_secs = other.sweep_interval_secs;
        }
        if other.interpreter.is_some() {
            self.interpreter = other.interpreter;
        }
    }
}

// ============================================================================
// Shell Settings
// ============================================================================

/// Command task settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSettings {
    /// Shell used when a request names none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_shell: Option<ShellType>,

    /// Working directory used when a request names none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_working_dir: Option<PathBuf>,
}

impl ShellSettings {
    pub fn default_shell(&self) -> ShellType {
        self.default_shell.unwrap_or_default()
    }

    /// Configured directory, else the caller's home directory
    pub fn default_working_dir(&self) -> PathBuf {
        self.default_working_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn merge(&mut self, other: ShellSettings) {
        if other.default_shell.is_some() {
            self.default_shell = other.default_shell;
        }
        if other.default_working_dir.is_some() {
            self.default_working_dir = other.default_working_dir;
        }
    }
}

// ============================================================================
// Python Settings
// ============================================================================

/// One-shot python tool settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
}

impl PythonSettings {
    pub fn executable(&self) -> &str {
        self.executable.as_deref().unwrap_or(DEFAULT_INTERPRETER)
    }

    fn merge(&mut self, other: PythonSettings) {
        if other.executable.is_some() {
            self.executable = other.executable;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ReplConfig::default();
        assert_eq!(config.session.idle_timeout(), Duration::from_secs(300));
        assert_eq!(config.session.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.session.interpreter(), "python3");
        assert_eq!(config.shell.default_shell(), ShellType::Bash);
        assert_eq!(config.python.executable(), "python3");
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = ReplConfig::default();
        base.session.idle_timeout_secs = Some(120);
        base.session.interpreter = Some("python3.11".into());

        let mut later = ReplConfig::default();
        later.session.idle_timeout_secs = Some(30);
        later.shell.default_shell = Some(ShellType::Zsh);

        base.merge(later);

        assert_eq!(base.session.idle_timeout(), Duration::from_secs(30));
        // later has no interpreter, base keeps its own
        assert_eq!(base.session.interpreter(), "python3.11");
        assert_eq!(base.shell.default_shell(), ShellType::Zsh);
    }

    #[test]
    fn test_resolved_fills_defaults() {
        let mut config = ReplConfig::default();
        config.session.idle_timeout_secs = Some(90);

        let resolved = config.resolved();
        assert_eq!(resolved.session.idle_timeout_secs, Some(90));
        assert_eq!(resolved.session.sweep_interval_secs, Some(60));
        assert_eq!(resolved.shell.default_shell, Some(ShellType::Bash));
        assert_eq!(resolved.python.executable.as_deref(), Some("python3"));
        // Home is resolved at use time, not pinned into the file
        assert!(resolved.shell.default_working_dir.is_none());
    }

    #[test]
    fn test_load_file_camel_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "session": { "idleTimeoutSecs": 10, "sweepIntervalSecs": 0 },
                "shell": { "defaultShell": "sh", "defaultWorkingDir": "/tmp" }
            }"#,
        )
        .unwrap();

        let config = ReplConfig::load_file(&path).unwrap();
        assert_eq!(config.session.idle_timeout(), Duration::from_secs(10));
        // 0 is clamped so the sweep loop never spins
        assert_eq!(config.session.sweep_interval(), Duration::from_secs(1));
        assert_eq!(config.shell.default_shell(), ShellType::Sh);
        assert_eq!(config.shell.default_working_dir(), PathBuf::from("/tmp"));
    }
}
