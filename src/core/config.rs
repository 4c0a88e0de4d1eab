//! Logger configuration
//!
//! [`Config`] holds the level thresholds, the global filter and the set of
//! disabled features. It is read and replaced as a whole under the logger
//! lock; [`Logger::update_config`](crate::Logger::update_config) is the way
//! to change several fields atomically.
//!
//! [`ConfigFile`] is the serializable subset, for loading thresholds and
//! flags from JSON.

use super::error::{LoggerError, Result};
use super::filter::FilterRef;
use super::log_level::Level;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Bitmask of features switched off for every record of a logger.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Flags: u8 {
        /// Do not attach the prefix
        const PREFIX = 1 << 0;
        /// Do not attach static contexts
        const STATIC_CONTEXT = 1 << 1;
        /// Do not evaluate or attach dynamic contexts
        const DYNAMIC_CONTEXT = 1 << 2;
        /// Do not attach the mark
        const MARK = 1 << 3;
        /// Ignore count limiters
        const LIMIT_BY_COUNT = 1 << 4;
        /// Ignore time limiters
        const LIMIT_BY_TIME = 1 << 5;
        /// Do not record file, line, module and function
        const RUNTIME = 1 << 6;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::empty()
    }
}

impl Flags {
    /// Look up a single flag by name, in any case (`"limit_by_time"`)
    pub fn from_feature_name(name: &str) -> Option<Flags> {
        Self::from_name(&name.to_ascii_uppercase())
    }
}

/// Thresholds, global filter and disabled features of a logger.
#[derive(Clone)]
pub struct Config {
    /// Records below this level are discarded before they are built
    pub level: Level,
    /// Records at or above this level get a stack trace appended
    pub track_level: Level,
    /// Records at or above this level terminate the process once written
    pub exit_level: Level,
    /// Level used by [`Logger::timing`](crate::Logger::timing)
    pub timing_level: Level,
    /// Level used by [`Logger::panic`](crate::Logger::panic)
    pub panic_level: Level,
    /// Applied to every record before rate limiting
    pub filter: Option<FilterRef>,
    pub disabled: Flags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Level::Info,
            track_level: Level::Off,
            exit_level: Level::Off,
            timing_level: Level::Info,
            panic_level: Level::Panic,
            filter: None,
            disabled: Flags::empty(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("level", &self.level)
            .field("track_level", &self.track_level)
            .field("exit_level", &self.exit_level)
            .field("timing_level", &self.timing_level)
            .field("panic_level", &self.panic_level)
            .field("filter", &self.filter.is_some())
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// Serializable overlay for [`Config`].
///
/// Absent fields leave the current value untouched.
///
/// # Example
///
/// ```
/// use rust_slot_logger::{Config, ConfigFile, Flags, Level};
///
/// let file = ConfigFile::from_json(r#"{ "level": "debug", "disable": ["mark"] }"#).unwrap();
/// let config = file.apply(Config::default()).unwrap();
/// assert_eq!(config.level, Level::Debug);
/// assert!(config.disabled.contains(Flags::MARK));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub level: Option<String>,
    pub track_level: Option<String>,
    pub exit_level: Option<String>,
    pub timing_level: Option<String>,
    pub panic_level: Option<String>,
    /// Names of features to disable, e.g. `"prefix"` or `"limit_by_time"`
    pub disable: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Overlay this file onto `config`
    pub fn apply(&self, mut config: Config) -> Result<Config> {
        let levels = [
            (&self.level, &mut config.level),
            (&self.track_level, &mut config.track_level),
            (&self.exit_level, &mut config.exit_level),
            (&self.timing_level, &mut config.timing_level),
            (&self.panic_level, &mut config.panic_level),
        ];
        for (text, slot) in levels {
            if let Some(text) = text {
                *slot = text
                    .parse()
                    .map_err(|e: String| LoggerError::config("ConfigFile", e))?;
            }
        }

        if let Some(names) = &self.disable {
            let mut disabled = Flags::empty();
            for name in names {
                let flag = Flags::from_feature_name(name).ok_or_else(|| {
                    LoggerError::config("ConfigFile", format!("unknown feature flag '{}'", name))
                })?;
                disabled.insert(flag);
            }
            config.disabled = disabled;
        }

        Ok(config)
    }
}
