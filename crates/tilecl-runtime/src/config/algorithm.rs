use super::logger::{BinaryLogLevel, LoggerConfig};

/// Configuration of the parallel algorithms.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AlgorithmConfig {
    /// Logger for the strategy decisions taken by the algorithms.
    #[serde(default)]
    pub logger: LoggerConfig<BinaryLogLevel>,
    /// Seed of the pivot selection of the hybrid sort.
    #[serde(default = "sort_seed_default")]
    pub sort_seed: u64,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            sort_seed: sort_seed_default(),
        }
    }
}

fn sort_seed_default() -> u64 {
    0x5EED_0F_50F7
}
