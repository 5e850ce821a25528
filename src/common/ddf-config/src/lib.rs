use std::str::FromStr;

use common_error::{DdfError, DdfResult};
use serde::{Deserialize, Serialize};

pub const NUM_PREVIEW_ROWS_ENV: &str = "DDF_NUM_PREVIEW_ROWS";
pub const FIVE_NUMS_SAMPLE_SIZE_ENV: &str = "DDF_FIVE_NUMS_SAMPLE_SIZE";
pub const DEFAULT_SEED_ENV: &str = "DDF_DEFAULT_SEED";
pub const COMPUTE_THREADS_ENV: &str = "DDF_COMPUTE_THREADS";

/// Configurations for DDF to use during the execution of operations on a DistributedDataFrame.
///
/// Note that this should be immutable for the lifetime of a frame; frames derived from another
/// frame (drop_na, sample2ddf, ...) inherit the configuration of their parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdfExecutionConfig {
    /// Number of rows rendered when a frame is displayed.
    pub num_preview_rows: usize,
    /// Per-column reservoir capacity used to estimate quantiles in `five_nums`.
    pub five_nums_sample_size: usize,
    /// Seed applied to randomized operations that are not given an explicit seed.
    pub default_seed: Option<u64>,
    /// Worker threads of the compute runtime. `None` uses every available CPU.
    pub compute_threads: Option<usize>,
}

impl Default for DdfExecutionConfig {
    fn default() -> Self {
        Self {
            num_preview_rows: 8,
            five_nums_sample_size: 10_000,
            default_seed: None,
            compute_threads: None,
        }
    }
}

fn parse_env_var<T: FromStr>(name: &str) -> DdfResult<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse::<T>().map(Some).map_err(|_| {
            DdfError::ValueError(format!(
                "Could not parse environment variable {name}={val:?}"
            ))
        }),
        Err(_) => Ok(None),
    }
}

impl DdfExecutionConfig {
    /// Builds a config from defaults overridden by `DDF_*` environment variables.
    ///
    /// Variables that are set but unparseable are reported and ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        match parse_env_var::<usize>(NUM_PREVIEW_ROWS_ENV) {
            Ok(Some(val)) => cfg.num_preview_rows = val,
            Ok(None) => {}
            Err(e) => log::warn!("{e}"),
        }
        match parse_env_var::<usize>(FIVE_NUMS_SAMPLE_SIZE_ENV) {
            Ok(Some(val)) if val > 0 => cfg.five_nums_sample_size = val,
            Ok(Some(_)) => log::warn!("{FIVE_NUMS_SAMPLE_SIZE_ENV} must be positive, ignoring"),
            Ok(None) => {}
            Err(e) => log::warn!("{e}"),
        }
        match parse_env_var::<u64>(DEFAULT_SEED_ENV) {
            Ok(seed) => cfg.default_seed = seed,
            Err(e) => log::warn!("{e}"),
        }
        match parse_env_var::<usize>(COMPUTE_THREADS_ENV) {
            Ok(Some(val)) if val > 0 => cfg.compute_threads = Some(val),
            Ok(Some(_)) => log::warn!("{COMPUTE_THREADS_ENV} must be positive, ignoring"),
            Ok(None) => {}
            Err(e) => log::warn!("{e}"),
        }
        cfg
    }

    #[must_use]
    pub fn with_default_seed(mut self, seed: Option<u64>) -> Self {
        self.default_seed = seed;
        self
    }

    #[must_use]
    pub fn with_five_nums_sample_size(mut self, size: usize) -> Self {
        self.five_nums_sample_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_num_preview_rows(mut self, rows: usize) -> Self {
        self.num_preview_rows = rows;
        self
    }

    pub fn to_json(&self) -> DdfResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a config serialized with [`DdfExecutionConfig::to_json`]. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> DdfResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
