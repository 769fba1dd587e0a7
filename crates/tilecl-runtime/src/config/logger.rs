use super::GlobalConfig;
use super::launch::LaunchLogLevel;
use core::fmt::Display;
use hashbrown::HashMap;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};

/// Configuration for logging in tilecl, parameterized by a log level type.
///
/// Note that you can use multiple loggers at the same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    ///
    /// ## Notes
    ///
    /// This parameter might get ignored when another category logs to the same file.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional crate-level logging configuration (e.g., info, debug, trace).
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// The log level for this logger, determining verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

/// Log levels using the `log` crate.
///
/// This enum defines verbosity levels for crate-level logging.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

fn append_default() -> bool {
    true
}

/// Trait for types that can be used as log levels in `LoggerConfig`.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Binary log level for enabling or disabling logging.
///
/// This enum provides a simple on/off toggle for logging.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryLogLevel {
    /// Logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// Logging is fully enabled.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for BinaryLogLevel {}

/// Central logging utility for tilecl, managing multiple log outputs.
#[derive(Debug)]
pub struct Logger {
    /// Collection of logger instances (file, stdout, stderr, or crate-level).
    loggers: Vec<LoggerKind>,

    /// Indices of loggers used for launch logging.
    launch_index: Vec<usize>,

    /// Indices of loggers used for algorithm logging.
    algorithm_index: Vec<usize>,

    /// Configuration the loggers were created from.
    pub config: Arc<GlobalConfig>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Hash, PartialEq, Eq)]
enum LoggerId {
    File(PathBuf),
    Stdout,
    Stderr,
    LogCrate(LogCrateLevel),
}

#[derive(Default)]
struct LoggerRegistry {
    loggers: Vec<LoggerKind>,
    ids: HashMap<LoggerId, usize>,
}

impl LoggerRegistry {
    // Registers every sink of the given config, sharing sinks already opened by another category.
    fn register<L: LogLevel>(&mut self, config: &LoggerConfig<L>) -> Vec<usize> {
        let mut indices = Vec::new();

        if let Some(file) = &config.file {
            let id = LoggerId::File(file.clone());
            if let Some(index) = self.ids.get(&id) {
                indices.push(*index);
            } else {
                match FileLogger::new(file, config.append) {
                    Ok(logger) => indices.push(self.insert(id, LoggerKind::File(logger))),
                    Err(err) => log::warn!("Unable to open log file {}: {err}", file.display()),
                }
            }
        }

        if config.stdout {
            indices.push(self.get_or_insert(LoggerId::Stdout, || LoggerKind::Stdout));
        }

        if config.stderr {
            indices.push(self.get_or_insert(LoggerId::Stderr, || LoggerKind::Stderr));
        }

        if let Some(level) = config.log {
            indices.push(self.get_or_insert(LoggerId::LogCrate(level), || LoggerKind::Log(level)));
        }

        indices
    }

    fn get_or_insert<F: FnOnce() -> LoggerKind>(&mut self, id: LoggerId, logger: F) -> usize {
        match self.ids.get(&id) {
            Some(index) => *index,
            None => self.insert(id, logger()),
        }
    }

    fn insert(&mut self, id: LoggerId, logger: LoggerKind) -> usize {
        let index = self.loggers.len();
        self.ids.insert(id, index);
        self.loggers.push(logger);
        index
    }
}

impl Logger {
    /// Creates a new `Logger` instance based on the global configuration.
    ///
    /// Note that creating a logger is quite expensive.
    pub fn new() -> Self {
        Self::from_config(GlobalConfig::get())
    }

    /// Creates a new `Logger` from the provided configuration.
    pub fn from_config(config: Arc<GlobalConfig>) -> Self {
        let mut registry = LoggerRegistry::default();

        let launch_index = match config.launch.logger.level {
            LaunchLogLevel::Disabled => Vec::new(),
            _ => registry.register(&config.launch.logger),
        };

        let algorithm_index = match config.algorithm.logger.level {
            BinaryLogLevel::Disabled => Vec::new(),
            BinaryLogLevel::Full => registry.register(&config.algorithm.logger),
        };

        Self {
            loggers: registry.loggers,
            launch_index,
            algorithm_index,
            config,
        }
    }

    /// Logs a message for a kernel launch, directing it to all configured launch loggers.
    pub fn log_launch<S: Display>(&mut self, msg: &S) {
        Self::log_all(&mut self.loggers, &self.launch_index, msg);
    }

    /// Logs a message for an algorithm, directing it to all configured algorithm loggers.
    pub fn log_algorithm<S: Display>(&mut self, msg: &S) {
        Self::log_all(&mut self.loggers, &self.algorithm_index, msg);
    }

    /// Returns the current launch log level.
    pub fn log_level_launch(&self) -> LaunchLogLevel {
        self.config.launch.logger.level
    }

    /// Returns the current algorithm log level.
    pub fn log_level_algorithm(&self) -> BinaryLogLevel {
        self.config.algorithm.logger.level
    }

    fn log_all<S: Display>(loggers: &mut [LoggerKind], indices: &[usize], msg: &S) {
        match indices {
            [] => {}
            [index] => loggers[*index].log(msg),
            indices => {
                let msg = msg.to_string();
                for index in indices {
                    loggers[*index].log(&msg);
                }
            }
        }
    }
}

/// Represents different types of loggers.
#[derive(Debug)]
enum LoggerKind {
    /// Logs to a file.
    File(FileLogger),

    /// Logs to standard output.
    Stdout,

    /// Logs to standard error.
    Stderr,

    /// Logs using the `log` crate with a specified level.
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

/// Logger that writes messages to a file.
#[derive(Debug)]
struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    // Creates a new file logger.
    fn new(path: &PathBuf, append: bool) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    // Logs a message to the file, flushing the buffer so the log survives a crash.
    fn log<S: Display>(&mut self, msg: &S) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());
        if let Err(err) = result {
            log::warn!("Unable to write to the log file: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tilecl-{}-{name}.log", std::process::id()))
    }

    #[test_log::test]
    fn categories_share_a_file_sink() {
        let path = temp_log("shared");
        let mut config = GlobalConfig::default();
        config.launch.logger.level = LaunchLogLevel::Basic;
        config.launch.logger.file = Some(path.clone());
        config.launch.logger.append = false;
        config.algorithm.logger.level = BinaryLogLevel::Full;
        config.algorithm.logger.file = Some(path.clone());

        let mut logger = Logger::from_config(Arc::new(config));
        assert_eq!(logger.loggers.len(), 1);

        logger.log_launch(&"launch reduce");
        logger.log_algorithm(&"sort leaves 4");
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(content, "launch reduce\nsort leaves 4\n");
    }

    #[test_log::test]
    fn disabled_categories_register_no_sink() {
        let mut config = GlobalConfig::default();
        config.launch.logger.stdout = true;
        config.algorithm.logger.log = Some(LogCrateLevel::Debug);

        let mut logger = Logger::from_config(Arc::new(config));
        logger.log_launch(&"ignored");

        assert!(logger.loggers.is_empty());
        assert_eq!(logger.log_level_launch(), LaunchLogLevel::Disabled);
    }

    #[test_log::test]
    fn unreachable_files_are_skipped() {
        let mut config = GlobalConfig::default();
        config.algorithm.logger.level = BinaryLogLevel::Full;
        config.algorithm.logger.file = Some("/definitely/not/here/tilecl.log".into());
        config.algorithm.logger.log = Some(LogCrateLevel::Info);

        let mut logger = Logger::from_config(Arc::new(config));
        logger.log_algorithm(&"still logged through log");

        assert_eq!(logger.loggers.len(), 1);
    }
}
