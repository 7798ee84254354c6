//! Signal-driven task abstraction.
//!
//! A signal task sleeps until something is queued for it, then runs one
//! tick that drains the queue. [`run`] drives a task through its whole
//! lifecycle.

use std::future::Future;

use crate::errors::SpeechError;
use crate::interface::{CommandHandler, EventHandler};

/// A component driven by queued commands and events.
pub trait SignalTask {
    /// Make `handler` available as `command` on a provided interface.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::CommandExists` if the command is already
    /// registered there.
    fn register_command(
        &mut self,
        interface: &str,
        command: &str,
        handler: CommandHandler,
    ) -> Result<(), SpeechError>;

    /// Observe `event` on a required interface, creating the interface if
    /// needed.
    fn subscribe_event(&mut self, interface: &str, event: &str, handler: EventHandler);

    /// Called once before the first tick.
    fn startup(&mut self);

    /// Wait for the next signal. Returns `false` when no more can arrive.
    fn wait_for_signal(&mut self) -> impl Future<Output = bool>;

    /// Process everything queued since the previous tick.
    fn on_tick(&mut self) -> impl Future<Output = ()>;

    /// Called once after the last tick.
    fn cleanup(&mut self);
}

/// Run `task` until its senders are gone.
///
/// ## Examples
///
/// ```ignore
/// use task_speaks::{task, TextToSpeech, SpeechConfig};
///
/// let (component, handle) = TextToSpeech::new(engine, &SpeechConfig::default());
/// handle.string_to_speech("hello");
/// drop(handle);
/// task::run(component).await;
/// ```
pub async fn run<T: SignalTask>(mut task: T) -> T {
    task.startup();
    while task.wait_for_signal().await {
        task.on_tick().await;
    }
    task.cleanup();
    task
}
