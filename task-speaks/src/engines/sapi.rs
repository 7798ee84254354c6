//! Windows SAPI (Speech API) engine.
//!
//! Drives a persistent `ISpVoice` COM object. COM is initialized on the
//! thread that calls `startup`, so the component must be driven from that
//! same thread (a current-thread runtime or a `LocalSet`).

use tracing::{debug, warn};
use windows::Win32::Media::Speech::{ISpVoice, SPF_IS_XML, SpVoice};
use windows::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx,
    CoUninitialize,
};
use windows::core::HSTRING;

use crate::config::SpeechConfig;
use crate::errors::SpeechError;
use crate::traits::SpeechEngine;
use crate::types::ToneRequest;

/// Speech engine backed by the Windows `SAPI.SpVoice` COM server.
#[derive(Debug)]
pub struct SapiEngine {
    voice: Option<ISpVoice>,
    com_initialized: bool,
    volume: u16,
}

impl SapiEngine {
    /// Engine name used in log records and errors.
    const ENGINE_NAME: &'static str = "SAPI";

    /// Create an engine that will speak at `volume` (0-100).
    pub fn new(volume: u16) -> Self {
        Self {
            voice: None,
            com_initialized: false,
            volume: volume.min(100),
        }
    }

    /// Create an engine from a configuration.
    ///
    /// ## Errors
    ///
    /// Never fails; the signature matches the other engines.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        Ok(Self::new(config.volume))
    }

    fn init_failed(source: windows::core::Error) -> SpeechError {
        SpeechError::EngineInitFailed {
            engine: Self::ENGINE_NAME.to_string(),
            source: Box::new(source),
        }
    }
}

impl SpeechEngine for SapiEngine {
    fn name(&self) -> &str {
        Self::ENGINE_NAME
    }

    fn startup(&mut self) -> Result<(), SpeechError> {
        // SAFETY: paired with CoUninitialize in shutdown.
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
            .ok()
            .map_err(Self::init_failed)?;
        self.com_initialized = true;

        // SAFETY: SpVoice is a registered in-process COM class.
        let voice: ISpVoice = unsafe { CoCreateInstance(&SpVoice, None, CLSCTX_INPROC_SERVER) }
            .map_err(Self::init_failed)?;
        // SAFETY: voice is a live ISpVoice.
        unsafe { voice.SetVolume(self.volume) }.map_err(Self::init_failed)?;

        debug!(engine = Self::ENGINE_NAME, volume = self.volume, "Voice created");
        self.voice = Some(voice);
        Ok(())
    }

    async fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        let Some(voice) = &self.voice else {
            return Err(SpeechError::EngineUnavailable {
                engine: Self::ENGINE_NAME.to_string(),
            });
        };

        let wide = HSTRING::from(text);
        // SAFETY: wide outlives the synchronous call.
        unsafe { voice.Speak(&wide, SPF_IS_XML.0 as u32, None) }.map_err(|e| {
            SpeechError::SpeechFailed {
                engine: Self::ENGINE_NAME.to_string(),
                source: Box::new(e),
            }
        })
    }

    async fn beep(&mut self, tone: ToneRequest) -> Result<(), SpeechError> {
        warn!(
            engine = Self::ENGINE_NAME,
            duration = tone.duration,
            frequency = tone.frequency,
            amplitude = tone.amplitude,
            "Tone rendering not implemented on this platform"
        );
        Ok(())
    }

    fn shutdown(&mut self) {
        // Dropping the interface releases the COM object.
        self.voice = None;
        if self.com_initialized {
            // SAFETY: matches the successful CoInitializeEx in startup.
            unsafe { CoUninitialize() };
            self.com_initialized = false;
        }
    }
}

impl Drop for SapiEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
