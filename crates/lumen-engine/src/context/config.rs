/// Engine-wide tuning for one context.
///
/// Defaults suit an interactive renderer; [`EngineConfig::from_env`] allows
/// overriding the most common knobs without recompiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run data sources (decoding, rasterization) on worker threads.
    pub threading: bool,

    /// Worker thread count when `threading` is enabled.
    pub worker_threads: usize,

    /// Number of recently used resources kept alive by the cache even when
    /// nothing references them.
    pub resource_cache_limit: usize,

    /// Number of gradient lookup textures kept alive.
    pub gradient_cache_limit: usize,

    /// Minimum float capacity of a shared vertex block.
    pub shared_vertex_block_floats: usize,

    /// Upper bound for a shared vertex block, whatever the previous frames
    /// used.
    pub max_shared_vertex_block_floats: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(2, |n| n.get());
        Self {
            threading: true,
            worker_threads: cores.saturating_sub(1).clamp(1, 8),
            resource_cache_limit: 256,
            gradient_cache_limit: 32,
            shared_vertex_block_floats: 64 * 1024,
            max_shared_vertex_block_floats: 1024 * 1024,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `LUMEN_THREADING`, `LUMEN_WORKER_THREADS` and
    /// `LUMEN_RESOURCE_CACHE_LIMIT`. Unparsable values are ignored with a
    /// warning.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(threading) = lookup("LUMEN_THREADING").and_then(|raw| parse_flag("LUMEN_THREADING", &raw)) {
            self.threading = threading;
        }
        if let Some(threads) = lookup("LUMEN_WORKER_THREADS").and_then(|raw| parse_count("LUMEN_WORKER_THREADS", &raw)) {
            self.worker_threads = threads.max(1);
        }
        if let Some(limit) =
            lookup("LUMEN_RESOURCE_CACHE_LIMIT").and_then(|raw| parse_count("LUMEN_RESOURCE_CACHE_LIMIT", &raw))
        {
            self.resource_cache_limit = limit;
        }
        self
    }
}

fn parse_flag(name: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => {
            log::warn!("ignoring {name}={raw:?}: expected a boolean");
            None
        }
    }
}

fn parse_count(name: &str, raw: &str) -> Option<usize> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring {name}={raw:?}: {err}");
            None
        }
    }
}
