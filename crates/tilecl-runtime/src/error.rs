use thiserror::Error;

/// Errors raised while loading or saving a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file couldn't be read.
    #[error("Unable to read the configuration file\nCaused by:\n  {0}")]
    Io(#[from] std::io::Error),

    /// The file doesn't have the right format.
    #[error("The configuration file doesn't have the right format\nCaused by:\n  {0}")]
    Format(#[from] toml::de::Error),

    /// The configuration couldn't be serialized.
    #[error("Unable to serialize the configuration\nCaused by:\n  {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors raised while creating a compute client.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The dedicated worker pool couldn't be created.
    #[error("Unable to create a worker pool with {workers} workers\nCaused by:\n  {source}")]
    WorkerPool {
        /// The requested number of workers.
        workers: usize,
        /// The error reported by the pool builder.
        source: rayon::ThreadPoolBuildError,
    },
}
