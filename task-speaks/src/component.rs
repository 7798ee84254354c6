//! The text-to-speech component.
//!
//! Requests arrive as commands on the "Configuration" and "Commands"
//! provided interfaces, or as events on required interfaces added with the
//! `add_interface_required_for_event_*` methods. In normal mode every
//! request is rendered as soon as it is dispatched. In preemptive mode only
//! the last text and the last tone received during a tick are rendered, at
//! the end of that tick.

use tracing::{debug, error, trace, warn};

use crate::config::SpeechConfig;
use crate::errors::SpeechError;
use crate::interface::{
    BUTTON_EVENT, COMMANDS_INTERFACE, CONFIGURATION_INTERFACE, CommandHandler, EventHandler,
    Interfaces, Payload,
};
use crate::mailbox::{ComponentHandle, Mailbox, Message};
use crate::task::{self, SignalTask};
use crate::traits::SpeechEngine;
use crate::types::{ButtonEvent, PendingSlot, SpeechRequest, ToneRequest};

/// Commands registered on each default provided interface.
const DEFAULT_COMMANDS: [(&str, &[CommandHandler]); 2] = [
    (
        CONFIGURATION_INTERFACE,
        &[
            CommandHandler::AddInterfaceRequiredForEventButton,
            CommandHandler::SetPreemptive,
        ],
    ),
    (
        COMMANDS_INTERFACE,
        &[
            CommandHandler::StringToSpeech,
            CommandHandler::CharacterToSpeech,
            CommandHandler::Beep,
        ],
    ),
];

/// Converts text, characters, button events and tone requests into sound.
///
/// ## Examples
///
/// ```ignore
/// use task_speaks::{engines::ShellEngine, SpeechConfig, TextToSpeech};
///
/// let (component, handle) = TextToSpeech::new(ShellEngine::host_default(), &SpeechConfig::default());
/// handle.string_to_speech("Hello, world!");
/// drop(handle);
/// component.run().await;
/// ```
#[derive(Debug)]
pub struct TextToSpeech<E> {
    name: String,
    engine: E,
    engine_ready: bool,
    interfaces: Interfaces,
    mailbox: Mailbox,
    preemptive: bool,
    pending: PendingSlot,
}

/// Name given to components created with [`TextToSpeech::new`].
const DEFAULT_NAME: &str = "text-to-speech";

impl<E: SpeechEngine> TextToSpeech<E> {
    /// Create a component and the handle used to send it requests.
    ///
    /// Interface registration failures are logged; the component is still
    /// returned without the failed interface.
    pub fn new(engine: E, config: &SpeechConfig) -> (Self, ComponentHandle) {
        let (mailbox, handle) = Mailbox::channel();
        let mut component = Self {
            name: DEFAULT_NAME.to_string(),
            engine,
            engine_ready: true,
            interfaces: Interfaces::default(),
            mailbox,
            preemptive: config.preemptive,
            pending: PendingSlot::default(),
        };
        component.add_default_interfaces();
        (component, handle)
    }

    /// Rename the component, used in log records.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn add_default_interfaces(&mut self) {
        for (interface, handlers) in DEFAULT_COMMANDS {
            let provided = match self.interfaces.add_provided(interface) {
                Ok(provided) => provided,
                Err(e) => {
                    error!(
                        component = %self.name,
                        interface = interface,
                        error = %e,
                        "Failed to add provided interface"
                    );
                    continue;
                }
            };
            for &handler in handlers {
                if let Err(e) = provided.register_command(handler.command_name(), handler) {
                    error!(component = %self.name, error = %e, "Failed to add command");
                }
            }
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The component's interfaces.
    pub fn interfaces(&self) -> &Interfaces {
        &self.interfaces
    }

    /// `false` after the engine failed to start.
    pub fn is_engine_ready(&self) -> bool {
        self.engine_ready
    }

    /// `true` in preemptive mode.
    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    /// Turn preemptive mode on or off.
    ///
    /// Queued like the other direct requests, so it applies at the next tick
    /// between the requests queued before and after it.
    pub fn set_preemptive(&mut self, preemptive: bool) {
        self.queue_command(
            CONFIGURATION_INTERFACE,
            CommandHandler::SetPreemptive,
            preemptive,
        );
    }

    // ------------------------------------------------------------------------
    // Intake
    // ------------------------------------------------------------------------

    /// Queue `text` for the next tick, the same as
    /// [`ComponentHandle::string_to_speech`].
    pub fn string_to_speech(&mut self, text: impl Into<String>) {
        let text: String = text.into();
        self.queue_command(COMMANDS_INTERFACE, CommandHandler::StringToSpeech, text);
    }

    /// Queue a single character for the next tick.
    pub fn character_to_speech(&mut self, character: char) {
        self.queue_command(
            COMMANDS_INTERFACE,
            CommandHandler::CharacterToSpeech,
            character,
        );
    }

    /// Queue "pressed", "released" or "undefined" for a button event.
    pub fn button_to_speech(&mut self, button: &ButtonEvent) {
        self.string_to_speech(SpeechRequest::from_button(button).text);
    }

    /// Queue a tone for the next tick.
    pub fn beep(&mut self, tone: ToneRequest) {
        self.queue_command(COMMANDS_INTERFACE, CommandHandler::Beep, tone);
    }

    fn queue_command(
        &mut self,
        interface: &str,
        handler: CommandHandler,
        payload: impl Into<Payload>,
    ) {
        self.mailbox.push(Message::Command {
            interface: interface.to_string(),
            command: handler.command_name().to_string(),
            payload: payload.into(),
        });
    }

    fn apply_preemptive(&mut self, preemptive: bool) {
        debug!(component = %self.name, preemptive = preemptive, "Preemptive mode set");
        self.preemptive = preemptive;
    }

    /// Speak now, or keep as the pending text in preemptive mode.
    async fn accept_text(&mut self, request: SpeechRequest) {
        if self.preemptive {
            trace!(component = %self.name, text = %request.text, "Text pending");
            self.pending.absorb_text(request.text);
        } else {
            self.render_text(&request.text).await;
        }
    }

    async fn accept_tone(&mut self, tone: ToneRequest) {
        if self.preemptive {
            trace!(component = %self.name, ?tone, "Tone pending");
            self.pending.absorb_tone(tone);
        } else {
            self.render_tone(tone).await;
        }
    }

    // ------------------------------------------------------------------------
    // Event Registration
    // ------------------------------------------------------------------------

    /// Speak string payloads of `event` on a required interface.
    ///
    /// The interface is created unless it already exists.
    pub fn add_interface_required_for_event_string(&mut self, interface: &str, event: &str) {
        self.subscribe_event(interface, event, EventHandler::String);
    }

    /// Speak character payloads of `event` on a required interface.
    ///
    /// The interface is created unless it already exists.
    pub fn add_interface_required_for_event_character(&mut self, interface: &str, event: &str) {
        self.subscribe_event(interface, event, EventHandler::Character);
    }

    /// Speak "Button" events on a required interface.
    ///
    /// The interface is created unless it already exists.
    pub fn add_interface_required_for_event_button(&mut self, interface: &str) {
        self.subscribe_event(interface, BUTTON_EVENT, EventHandler::Button);
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Start the engine. On failure the component keeps running but no
    /// longer hands text to the engine.
    pub fn startup(&mut self) {
        match self.engine.startup() {
            Ok(()) => {
                self.engine_ready = true;
                debug!(component = %self.name, engine = self.engine.name(), "Engine started");
            }
            Err(e) => {
                self.engine_ready = false;
                error!(
                    component = %self.name,
                    engine = self.engine.name(),
                    error = %e,
                    "Engine failed to start, text requests will be ignored"
                );
            }
        }
    }

    /// Run one tick: clear the pending slot, dispatch everything queued,
    /// then render the pending text and tone if in preemptive mode.
    pub async fn tick(&mut self) {
        self.pending.clear();

        while let Some(message) = self.mailbox.try_next() {
            if let Err(e) = self.dispatch(message).await {
                warn!(component = %self.name, error = %e, "Dropped message");
            }
        }

        if self.preemptive {
            if let Some(text) = self.pending.take_text() {
                self.render_text(&text).await;
            }
            if let Some(tone) = self.pending.take_tone() {
                self.render_tone(tone).await;
            }
        }
    }

    /// Stop the engine.
    pub fn cleanup(&mut self) {
        self.engine.shutdown();
        debug!(component = %self.name, engine = self.engine.name(), "Engine stopped");
    }

    /// Start, tick on every signal until all handles are dropped, clean up.
    pub async fn run(self) -> Self {
        task::run(self).await
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    async fn dispatch(&mut self, message: Message) -> Result<(), SpeechError> {
        match message {
            Message::Command {
                interface,
                command,
                payload,
            } => {
                let handler = self.interfaces.resolve_command(&interface, &command)?;
                self.execute_command(handler, payload).await
            }
            Message::Event {
                interface,
                event,
                payload,
            } => {
                let handler = self.interfaces.resolve_event(&interface, &event)?;
                self.handle_event(handler, payload).await
            }
        }
    }

    async fn execute_command(
        &mut self,
        handler: CommandHandler,
        payload: Payload,
    ) -> Result<(), SpeechError> {
        match (handler, payload) {
            (CommandHandler::SetPreemptive, Payload::Bool(preemptive)) => {
                self.apply_preemptive(preemptive);
            }
            (CommandHandler::AddInterfaceRequiredForEventButton, Payload::Text(interface)) => {
                self.add_interface_required_for_event_button(&interface);
            }
            (CommandHandler::StringToSpeech, Payload::Text(text)) => {
                self.accept_text(SpeechRequest::from_text(text)).await;
            }
            (CommandHandler::CharacterToSpeech, Payload::Character(character)) => {
                self.accept_text(SpeechRequest::from_character(character))
                    .await;
            }
            (CommandHandler::Beep, Payload::Tone(tone)) => self.accept_tone(tone).await,
            (handler, payload) => {
                return Err(SpeechError::PayloadMismatch {
                    handler: handler.command_name(),
                    expected: handler.payload_kind(),
                    found: payload.kind(),
                });
            }
        }
        Ok(())
    }

    async fn handle_event(
        &mut self,
        handler: EventHandler,
        payload: Payload,
    ) -> Result<(), SpeechError> {
        match (handler, payload) {
            (EventHandler::String, Payload::Text(text)) => {
                self.accept_text(SpeechRequest::from_text(text)).await;
            }
            (EventHandler::Character, Payload::Character(character)) => {
                self.accept_text(SpeechRequest::from_character(character))
                    .await;
            }
            (EventHandler::Button, Payload::Button(button)) => {
                self.accept_text(SpeechRequest::from_button(&button)).await;
            }
            (handler, payload) => {
                return Err(SpeechError::PayloadMismatch {
                    handler: handler.name(),
                    expected: handler.payload_kind(),
                    found: payload.kind(),
                });
            }
        }
        Ok(())
    }

    async fn render_text(&mut self, text: &str) {
        if !self.engine_ready {
            trace!(component = %self.name, text = text, "Engine not ready, text ignored");
            return;
        }
        if let Err(e) = self.engine.speak(text).await {
            error!(
                component = %self.name,
                engine = self.engine.name(),
                error = %e,
                "Failed to speak"
            );
        }
    }

    async fn render_tone(&mut self, tone: ToneRequest) {
        if let Err(e) = self.engine.beep(tone).await {
            error!(
                component = %self.name,
                engine = self.engine.name(),
                error = %e,
                "Failed to play tone"
            );
        }
    }
}

impl<E: SpeechEngine> SignalTask for TextToSpeech<E> {
    fn register_command(
        &mut self,
        interface: &str,
        command: &str,
        handler: CommandHandler,
    ) -> Result<(), SpeechError> {
        self.interfaces
            .ensure_provided(interface)
            .register_command(command, handler)
    }

    fn subscribe_event(&mut self, interface: &str, event: &str, handler: EventHandler) {
        debug!(
            component = %self.name,
            interface = interface,
            event = event,
            handler = handler.name(),
            "Observing event"
        );
        self.interfaces
            .add_required(interface)
            .subscribe_event(event, handler);
    }

    fn startup(&mut self) {
        TextToSpeech::startup(self);
    }

    async fn wait_for_signal(&mut self) -> bool {
        self.mailbox.wait().await
    }

    async fn on_tick(&mut self) {
        self.tick().await;
    }

    fn cleanup(&mut self) {
        TextToSpeech::cleanup(self);
    }
}

// ============================================================================
// Tests
// ============================================================================
