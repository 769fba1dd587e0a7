use core::fmt::Display;
use std::sync::Arc;

use rayon::prelude::*;
use web_time::Instant;

use crate::{
    ExecutionPolicy, HardwareProperties, LaunchError, Tile, TiledDomain,
    config::{BinaryLogLevel, GlobalConfig, Logger, launch::LaunchLogLevel},
};

/// The ComputeClient is the entry point to launch tile kernels.
///
/// A launch runs one kernel invocation per tile of a [TiledDomain]. Tiles run concurrently on
/// the worker pool of the client and every launch returns the value produced by each tile, in
/// tile order. A launch returning is the global barrier: everything a tile wrote is visible to
/// the next launch.
#[derive(Clone, Debug)]
pub struct ComputeClient {
    policy: ExecutionPolicy,
    properties: HardwareProperties,
    config: Arc<GlobalConfig>,
    logger: Arc<spin::Mutex<Logger>>,
    launch_level: LaunchLogLevel,
    algorithm_level: BinaryLogLevel,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for ComputeClient {
    /// A client using the policy resolved from the global configuration, on the global worker
    /// pool.
    fn default() -> Self {
        let config = GlobalConfig::get();
        let properties = HardwareProperties::query();
        let policy = ExecutionPolicy::from_properties(&properties, &config.policy);

        Self::build(policy, properties, config)
    }
}

impl ComputeClient {
    /// Create a new client executing with the given policy on the global worker pool.
    pub fn new(policy: ExecutionPolicy) -> Self {
        Self::build(policy, HardwareProperties::query(), GlobalConfig::get())
    }

    /// Create a new client from the global configuration.
    pub fn from_config() -> Result<Self, LaunchError> {
        Self::with_config(GlobalConfig::get())
    }

    /// Create a new client from the provided configuration.
    ///
    /// Creates a dedicated worker pool when the configuration sets `num_workers`.
    pub fn with_config(config: Arc<GlobalConfig>) -> Result<Self, LaunchError> {
        let properties = HardwareProperties::query();
        let policy = ExecutionPolicy::from_properties(&properties, &config.policy);
        let workers = config.policy.num_workers;
        let client = Self::build(policy, properties, config);

        match workers {
            Some(workers) => client.with_workers(workers),
            None => Ok(client),
        }
    }

    fn build(
        policy: ExecutionPolicy,
        properties: HardwareProperties,
        config: Arc<GlobalConfig>,
    ) -> Self {
        let logger = Logger::from_config(config.clone());

        Self {
            policy,
            properties,
            launch_level: logger.log_level_launch(),
            algorithm_level: logger.log_level_algorithm(),
            logger: Arc::new(spin::Mutex::new(logger)),
            config,
            pool: None,
        }
    }

    /// Executes the launches of this client on a dedicated pool of `workers` threads.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, LaunchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("tilecl-worker-{index}"))
            .build()
            .map_err(|source| LaunchError::WorkerPool { workers, source })?;

        self.pool = Some(Arc::new(pool));
        Ok(self)
    }

    /// The same client with another execution policy.
    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The execution policy of the client.
    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    /// The hardware properties queried when the client was created.
    pub fn properties(&self) -> &HardwareProperties {
        &self.properties
    }

    /// The configuration the client was created from.
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Launches `kernel` on every tile of `domain`.
    ///
    /// Returns the result of every tile, in tile order. An empty domain launches nothing.
    pub fn launch<R, K>(&self, name: &str, domain: TiledDomain, kernel: K) -> Vec<R>
    where
        R: Send,
        K: Fn(&Tile) -> R + Sync,
    {
        if domain.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let outputs = self.install(|| {
            (0..domain.tile_count)
                .into_par_iter()
                .map(|pos| {
                    let tile = Tile::new(pos, &domain);
                    let output = kernel(&tile);
                    (output, tile.barrier_count())
                })
                .collect::<Vec<_>>()
        });

        self.finish(name, domain.tile_count as usize, domain.len, start, outputs)
    }

    /// Launches `kernel` on every tile of `domain`, handing each tile the chunk of `data` it owns.
    ///
    /// `data` must cover the whole domain. Tiles own disjoint chunks, so no synchronization is
    /// needed to write them.
    pub fn launch_mut<T, R, K>(
        &self,
        name: &str,
        domain: TiledDomain,
        data: &mut [T],
        kernel: K,
    ) -> Vec<R>
    where
        T: Send,
        R: Send,
        K: Fn(&Tile, &mut [T]) -> R + Sync,
    {
        debug_assert_eq!(data.len(), domain.len, "The data must cover the domain");
        if domain.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let outputs = self.install(|| {
            data.par_chunks_mut(domain.work_per_tile)
                .enumerate()
                .map(|(pos, chunk)| {
                    let tile = Tile::new(pos as u32, &domain);
                    let output = kernel(&tile, chunk);
                    (output, tile.barrier_count())
                })
                .collect::<Vec<_>>()
        });

        self.finish(name, domain.tile_count as usize, domain.len, start, outputs)
    }

    /// Launches one tile per segment, each tile owning its whole segment.
    ///
    /// The range of every tile is the index space of its segment.
    pub fn launch_segments<T, R, K>(&self, name: &str, segments: Vec<&mut [T]>, kernel: K) -> Vec<R>
    where
        T: Send,
        R: Send,
        K: Fn(&Tile, &mut [T]) -> R + Sync,
    {
        if segments.is_empty() {
            return Vec::new();
        }

        let count = segments.len();
        let len = segments.iter().map(|segment| segment.len()).sum();
        let dim = self.policy.tile_dim();

        let start = Instant::now();
        let outputs = self.install(|| {
            segments
                .into_par_iter()
                .enumerate()
                .map(|(pos, segment)| {
                    let tile = Tile::with_range(pos as u32, count as u32, dim, 0..segment.len());
                    let output = kernel(&tile, segment);
                    (output, tile.barrier_count())
                })
                .collect::<Vec<_>>()
        });

        self.finish(name, count, len, start, outputs)
    }

    /// Logs a strategy decision of an algorithm.
    ///
    /// The message is only formatted when algorithm logs are enabled.
    pub fn log_algorithm<S: Display>(&self, msg: S) {
        if let BinaryLogLevel::Full = self.algorithm_level {
            self.logger.lock().log_algorithm(&msg);
        }
    }

    fn install<R: Send, F: FnOnce() -> R + Send>(&self, func: F) -> R {
        match &self.pool {
            Some(pool) => pool.install(func),
            None => func(),
        }
    }

    fn finish<R>(
        &self,
        name: &str,
        tiles: usize,
        len: usize,
        start: Instant,
        outputs: Vec<(R, u32)>,
    ) -> Vec<R> {
        let (outputs, barriers): (Vec<R>, Vec<u32>) = outputs.into_iter().unzip();
        let width = self.policy.tile_width();

        match self.launch_level {
            LaunchLogLevel::Disabled => {}
            LaunchLogLevel::Basic => {
                self.logger.lock().log_launch(&format_args!(
                    "[Launch] {name}: tiles {tiles}, width {width}, len {len}"
                ));
            }
            LaunchLogLevel::Full => {
                let barriers = barriers.iter().map(|count| *count as u64).sum::<u64>();
                let elapsed = start.elapsed();
                self.logger.lock().log_launch(&format_args!(
                    "[Launch] {name}: tiles {tiles}, width {width}, len {len}, barriers {barriers}, elapsed {elapsed:?}"
                ));
            }
        }

        outputs
    }
}
