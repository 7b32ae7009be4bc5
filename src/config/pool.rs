//! Worker pool configuration.

use serde::{Deserialize, Serialize};

/// Worker count used by [`PoolConfig::default`].
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Stack size used by [`PoolConfig::default`] (2 MiB).
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Smallest accepted worker stack size (64 KiB).
const MIN_THREAD_STACK_SIZE: usize = 64 * 1024;

fn default_thread_name_prefix() -> String {
    "tl-worker".to_string()
}

/// Pool configuration.
///
/// The worker count is the only knob that changes runtime behavior; it is
/// fixed at construction and the pool never resizes. Stack size and thread
/// naming exist for operational tuning and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads, fixed for the pool's lifetime.
    pub worker_count: usize,
    /// Stack size per worker thread, in bytes.
    pub thread_stack_size: usize,
    /// Worker threads are named `{prefix}-{index}`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

impl PoolConfig {
    /// Default configuration sized to the machine: one worker per logical
    /// CPU.
    #[must_use]
    pub fn auto() -> Self {
        Self::default().with_worker_count(num_cpus::get().max(1))
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the per-worker stack size in bytes.
    #[must_use]
    pub fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.thread_stack_size < MIN_THREAD_STACK_SIZE {
            return Err(format!(
                "thread_stack_size must be at least {MIN_THREAD_STACK_SIZE} bytes"
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        Ok(())
    }

    /// Parse a pool configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
