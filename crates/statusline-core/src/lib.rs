//! statusline-core: Core library for the coding-assistant statusline
//!
//! Everything the renderer needs except terminal styling. The hot path never
//! touches the network: quota data comes from a cache that a detached worker
//! refreshes in the background.
//!
//! # Main Entry Points
//!
//! - [`quota`] - Cache, refresh lock, fetch worker and staleness policy
//! - [`session`] - Lenient parsing of the host's stdin JSON
//! - [`git`] - Cached current-branch lookup
//! - [`credentials`] - OAuth token lookup
//! - [`profile`] - Rig profile detection

pub mod credentials;
pub mod errors;
pub mod git;
pub mod logging;
pub mod profile;
pub mod quota;
pub mod session;

pub use errors::StatusError;
pub use git::BranchLookup;
pub use session::SessionInput;

pub use statusline_config::{ConfigError, GitConfig, QuotaConfig, StatusConfig};
pub use statusline_paths::{PathError, StatusPaths};

// Re-export logging initialization
pub use logging::init_logging;
