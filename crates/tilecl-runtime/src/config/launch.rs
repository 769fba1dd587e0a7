use super::logger::{LogLevel, LoggerConfig};

/// Configuration of the kernel launch logs.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LaunchConfig {
    /// Logger for every kernel launched by a client.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
}

/// Verbosity of the launch logs.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LaunchLogLevel {
    /// Launches aren't logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    /// Logs the kernel name and the launch shape.
    #[serde(rename = "basic")]
    Basic,
    /// Also logs the barriers crossed and the elapsed time.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LaunchLogLevel {}
