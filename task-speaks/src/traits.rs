//! The capability trait implemented once per platform speech facility.

use std::future::Future;

use crate::errors::SpeechError;
use crate::types::ToneRequest;

/// A speech/tone facility the component hands its requests to.
///
/// Every call runs to completion before returning: the returned futures
/// resolve only once the external program or platform API is done.
///
/// ## Examples
///
/// ```ignore
/// use task_speaks::{SpeechEngine, SpeechError, ToneRequest};
///
/// struct Silent;
///
/// impl SpeechEngine for Silent {
///     fn name(&self) -> &str { "silent" }
///     async fn speak(&mut self, _text: &str) -> Result<(), SpeechError> { Ok(()) }
///     async fn beep(&mut self, _tone: ToneRequest) -> Result<(), SpeechError> { Ok(()) }
/// }
/// ```
pub trait SpeechEngine {
    /// Short name used in log records and errors.
    fn name(&self) -> &str;

    /// Acquire whatever the engine needs before the first request.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::EngineInitFailed` when the platform facility
    /// cannot be brought up. The component stays running but will not
    /// hand this engine any text.
    fn startup(&mut self) -> Result<(), SpeechError> {
        Ok(())
    }

    /// Render `text` as speech.
    ///
    /// ## Errors
    ///
    /// Returns an error when the invocation fails. The request is dropped,
    /// later requests are unaffected.
    fn speak(&mut self, text: &str) -> impl Future<Output = Result<(), SpeechError>>;

    /// Render a tone.
    ///
    /// Engines without tone support log and return `Ok(())`.
    fn beep(&mut self, tone: ToneRequest) -> impl Future<Output = Result<(), SpeechError>>;

    /// Release what `startup` acquired.
    fn shutdown(&mut self) {}
}

// ============================================================================
// Tests
// ============================================================================
