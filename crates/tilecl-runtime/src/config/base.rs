use std::path::Path;
use std::sync::Arc;

use super::{
    algorithm::AlgorithmConfig,
    launch::{LaunchConfig, LaunchLogLevel},
    logger::BinaryLogLevel,
    policy::PolicyConfig,
};
use crate::ConfigError;

/// Static mutex holding the global configuration, initialized as `None`.
static TILECL_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Name of the configuration file searched from the current directory upwards.
pub const CONFIG_FILE_NAME: &str = "tilecl.toml";

/// Represents the global configuration of tilecl, combining the execution policy overrides and
/// the logging settings of launches and algorithms.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Overrides of the execution policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Configuration of kernel launches.
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Configuration of the parallel algorithms.
    #[serde(default)]
    pub algorithm: AlgorithmConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `tilecl.toml` in the current
    /// directory or its parents, then applies the environment overrides. If no file is found, a
    /// default configuration is used.
    ///
    /// # Notes
    ///
    /// Calling this function takes a global lock. Clients read it once when they are created.
    pub fn get() -> Arc<Self> {
        let mut state = TILECL_GLOBAL_CONFIG.lock();

        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref())?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`.
    pub fn set(config: Self) {
        let mut state = TILECL_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Loads a configuration from the provided file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from its TOML representation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(self) -> Self {
        self.override_with(|key| std::env::var(key).ok())
    }

    /// Overrides configuration fields from the variables returned by `lookup`.
    ///
    /// - `TILECL_DEBUG_LOG`: `stdout`, `stderr`, `1`/`true` (logs to `/tmp/tilecl.log`),
    ///   `0`/`false` (disables the logs) or a file path. Enables every log category.
    /// - `TILECL_TILE_WIDTH`: the number of lanes per tile.
    /// - `TILECL_MAX_TILE_COUNT`: the maximum number of tiles of a launch.
    pub fn override_with<F: Fn(&str) -> Option<String>>(mut self, lookup: F) -> Self {
        if let Some(val) = lookup("TILECL_DEBUG_LOG") {
            self.launch.logger.level = LaunchLogLevel::Full;
            self.algorithm.logger.level = BinaryLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.launch.logger.stdout = true;
                    self.algorithm.logger.stdout = true;
                }
                "stderr" => {
                    self.launch.logger.stderr = true;
                    self.algorithm.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = "/tmp/tilecl.log";
                    self.launch.logger.file = Some(file_path.into());
                    self.algorithm.logger.file = Some(file_path.into());
                }
                "0" | "false" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                    self.algorithm.logger.level = BinaryLogLevel::Disabled;
                }
                file_path => {
                    self.launch.logger.file = Some(file_path.into());
                    self.algorithm.logger.file = Some(file_path.into());
                }
            }
        }

        if let Some(val) = lookup("TILECL_TILE_WIDTH") {
            match val.parse::<u32>() {
                Ok(width) => self.policy.tile_width = Some(width),
                Err(err) => log::warn!("Ignoring TILECL_TILE_WIDTH={val}: {err}"),
            }
        }

        if let Some(val) = lookup("TILECL_MAX_TILE_COUNT") {
            match val.parse::<u32>() {
                Ok(count) => self.policy.max_tile_count = Some(count),
                Err(err) => log::warn!("Ignoring TILECL_MAX_TILE_COUNT={val}: {err}"),
            }
        }

        self
    }

    // Loads the configuration from `tilecl.toml` in the current directory or its parents.
    //
    // Traverses up the directory tree until a configuration file is found or the root is
    // reached. A file that can't be parsed is reported and the defaults are used instead.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                return match Self::from_file(&path) {
                    Ok(config) => config,
                    Err(err) => {
                        log::warn!("Invalid configuration {}: {err}", path.display());
                        Self::default()
                    }
                };
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }
}
