//! Task Speaks
//!
//! A signal-driven component that turns text, characters, button events and
//! tone requests into sound using the host's speech facilities.
//!
//! ## Features
//!
//! - **Host engines**: command line tools on Unix-like systems (`say`,
//!   `espeak`, `flite`, `play`) and SAPI on Windows
//! - **Preemptive mode**: keep only the most recent text and tone per tick
//! - **Event observers**: speak string, character or button events from
//!   other components
//! - **Non-fatal failures**: every failed request is logged and dropped
//!
//! ## Quick Start
//!
//! ```ignore
//! use task_speaks::{host_engine, SpeechConfig, TextToSpeech};
//!
//! let config = SpeechConfig::default().with_env_overrides()?;
//! let (mut component, handle) = TextToSpeech::new(host_engine(&config)?, &config);
//! component.add_interface_required_for_event_character("Keyboard", "Key");
//!
//! handle.string_to_speech("Hello, world!");
//! drop(handle);
//! component.run().await;
//! ```
//!
//! ## Module Structure
//!
//! - [`types`] - Requests, button events and the pending slot
//! - [`errors`] - The `SpeechError` type
//! - [`config`] - `SpeechConfig` with file and environment sources
//! - [`traits`] - The `SpeechEngine` trait
//! - [`engines`] - Shell and SAPI engines
//! - [`interface`] - Provided/required interfaces and payloads
//! - [`mailbox`] - Queued delivery and `ComponentHandle`
//! - [`task`] - The `SignalTask` lifecycle
//! - [`component`] - The `TextToSpeech` component

pub mod component;
pub mod config;
pub mod engines;
pub mod errors;
pub mod interface;
pub mod mailbox;
pub mod task;
pub mod traits;
pub mod types;

pub use component::TextToSpeech;
pub use config::SpeechConfig;
pub use engines::{EngineCommandTemplate, HostEngine, ShellEngine, ToneCommandTemplate, host_engine};
#[cfg(target_os = "windows")]
pub use engines::SapiEngine;
pub use errors::SpeechError;
pub use interface::{
    BUTTON_EVENT, COMMANDS_INTERFACE, CONFIGURATION_INTERFACE, CommandHandler, EventHandler,
    Interfaces, Payload,
};
pub use mailbox::{ComponentHandle, Mailbox, Message};
pub use task::SignalTask;
pub use traits::SpeechEngine;
pub use types::{ButtonEvent, ButtonTransition, PendingSlot, SpeechRequest, ToneRequest};
