use envconfig::Envconfig;

use crate::error::Error;

/// Frames captured before the walker stops, unless overridden.
pub const DEFAULT_MAX_FRAMES: usize = 100;

/// Source lines captured on each side of a context line, unless overridden.
pub const DEFAULT_CONTEXT_LINES: usize = 5;

/// This crate's own root module, as it appears in requalified symbol names.
pub const SELF_MODULE: &str = "snare";

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    // The instrumentation library's own root module. Frames from this module
    // or any `/`-delimited child of it never reach a stacktrace. Injected
    // rather than hardcoded so embedders shipping us under another module
    // name still self-filter correctly.
    #[envconfig(from = "SNARE_SELF_MODULE", default = "snare")]
    pub self_module: String,

    #[envconfig(from = "SNARE_MAX_FRAMES", default = "100")]
    pub max_frames: usize,

    #[envconfig(from = "SNARE_CONTEXT_LINES", default = "5")]
    pub context_lines: usize,
}

impl Config {
    pub fn init_with_defaults() -> Result<Self, Error> {
        Ok(Self::init_from_env()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            self_module: SELF_MODULE.to_string(),
            max_frames: DEFAULT_MAX_FRAMES,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}
