use serde::{Deserialize, Serialize};

/// The environment variable read by [`ResolveOptions::from_env()`].
pub const PARALLEL_THRESHOLD_VAR: &str = "NDVIEW_PARALLEL_THRESHOLD";

/// Tuning knobs for resolving index expressions.
///
/// Missing fields take their default values when deserialising.
///
/// ```
/// use ndview::ResolveOptions;
/// let options: ResolveOptions = serde_json::from_str("{}").unwrap();
/// assert_eq!(options, ResolveOptions::default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// The smallest number of candidate offsets for which a boolean
    /// predicate is evaluated on the rayon thread pool.
    pub parallel_threshold: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {parallel_threshold: 4096}
    }
}

impl ResolveOptions {
    /// The default options, overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_lookup(|key| std::env::var(key).ok())
    }

    /// Overrides `self` with the variables that `lookup` finds.
    ///
    /// Values that do not parse are ignored.
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(PARALLEL_THRESHOLD_VAR) {
            match value.trim().parse() {
                Ok(threshold) => { self.parallel_threshold = threshold; },
                Err(e) => tracing::warn!(%value, error = %e, "ignoring {}", PARALLEL_THRESHOLD_VAR),
            }
        }
        self
    }

    /// Returns `self` with `parallel_threshold` replaced.
    pub fn with_parallel_threshold(self, parallel_threshold: usize) -> Self {
        Self {parallel_threshold, ..self}
    }
}

// ----------------------------------------------------------------------------
