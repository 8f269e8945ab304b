//! GitBridge core library: settings, descriptors, credentials and job types.
//!
//! Public API surface:
//! - [`config`]: [`Settings`] loaded from the environment
//! - [`credentials`]: token injection and redaction
//! - [`descriptor`]: per-directory `.gitinfo` parsing
//! - [`types`]: [`SyncJob`], [`FolderName`], [`Cancellation`]
//! - [`error`]: [`ConfigError`], [`DescriptorError`]

pub mod config;
pub mod credentials;
pub mod descriptor;
pub mod error;
pub mod types;

pub use config::{SecretToken, Settings};
pub use descriptor::SyncDescriptor;
pub use error::{ConfigError, DescriptorError};
pub use types::{Cancellation, FolderName, SyncJob};
