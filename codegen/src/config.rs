//! Lowering configuration.
//!
//! Typed configuration with a bon builder and environment variable fallbacks.

use bon::bon;

/// Verbosity at which buffer printing is switched on through `LUMEN_VLOG`.
const PRINT_BUFFERS_VLOG: u32 = 4;

/// Configuration for the launch lowering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoweringConfig {
    /// Print every `f32` argument buffer after each launch's actions.
    pub print_buffers: bool,
    /// Replace host round-trips of reused buffers with device transfers.
    pub elide_transfers: bool,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self { print_buffers: false, elide_transfers: true }
    }
}

#[bon]
impl LoweringConfig {
    /// Create a lowering configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = false)] print_buffers: bool,
        #[builder(default = true)] elide_transfers: bool,
    ) -> Self {
        Self { print_buffers, elide_transfers }
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `LUMEN_PRINT_BUFFERS` - Print `f32` buffers after each launch
    /// * `LUMEN_VLOG=N` - Verbosity; `N >= 4` also prints buffers
    /// * `LUMEN_NO_TRANSFER_ELISION` - Disable device-to-device transfers
    pub fn from_env() -> Self {
        let vlog = std::env::var("LUMEN_VLOG").ok().and_then(|s| s.parse::<u32>().ok()).unwrap_or(0);
        let print_buffers = std::env::var("LUMEN_PRINT_BUFFERS").is_ok() || vlog >= PRINT_BUFFERS_VLOG;
        let elide_transfers = std::env::var("LUMEN_NO_TRANSFER_ELISION").is_err();

        Self { print_buffers, elide_transfers }
    }
}
