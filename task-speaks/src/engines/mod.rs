//! Speech engine implementations.
//!
//! [`HostEngine`] names the engine this platform uses by default: the
//! SAPI engine on Windows and the shell engine everywhere else.

mod shell;
#[cfg(target_os = "windows")]
mod sapi;

pub use shell::{EngineCommandTemplate, ShellEngine, ToneCommandTemplate};
#[cfg(target_os = "windows")]
pub use sapi::SapiEngine;

use crate::config::SpeechConfig;
use crate::errors::SpeechError;

/// The default engine for this platform.
#[cfg(target_os = "windows")]
pub type HostEngine = SapiEngine;

/// The default engine for this platform.
#[cfg(not(target_os = "windows"))]
pub type HostEngine = ShellEngine;

/// Build the platform default engine from a configuration.
///
/// ## Errors
///
/// Returns `SpeechError::InvalidTemplate` if a configured command template
/// is malformed.
pub fn host_engine(config: &SpeechConfig) -> Result<HostEngine, SpeechError> {
    HostEngine::from_config(config)
}
