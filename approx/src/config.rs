use serde::{Deserialize, Serialize};

/// Consecutive outer indices handed to a worker as one task.
///
/// Rows of a template are ragged, so work is dealt out in small pieces and balanced by work
/// stealing rather than split evenly up front.
pub const GRAIN_SIZE: usize = 10;

/// Execution knobs for [`approximate_with_config`](crate::approximate_with_config).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproxConfig {
    /// Worker threads; `0` runs in the current pool.
    pub n_threads: usize,
    /// Outer indices per task; `0` is read as `1`.
    pub grain_size: usize,
}

impl Default for ApproxConfig {
    fn default() -> Self {
        Self {
            n_threads: 0,
            grain_size: GRAIN_SIZE,
        }
    }
}

impl ApproxConfig {
    #[must_use]
    pub const fn new(n_threads: usize) -> Self {
        Self {
            n_threads,
            grain_size: GRAIN_SIZE,
        }
    }

    #[must_use]
    pub const fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    #[must_use]
    pub const fn with_grain_size(mut self, grain_size: usize) -> Self {
        self.grain_size = grain_size;
        self
    }

    pub(crate) const fn effective_grain_size(&self) -> usize {
        if self.grain_size == 0 {
            1
        } else {
            self.grain_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ApproxConfig::default().with_threads(4).with_grain_size(0);
        assert_eq!(config.n_threads, 4);
        assert_eq!(config.effective_grain_size(), 1);
        assert_eq!(ApproxConfig::new(2).grain_size, GRAIN_SIZE);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ApproxConfig = serde_json::from_str(r#"{ "n_threads": 8 }"#).unwrap();
        assert_eq!(config, ApproxConfig::new(8));

        let config: ApproxConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ApproxConfig::default());
    }
}
