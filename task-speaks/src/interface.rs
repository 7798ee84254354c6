//! Named command and event interfaces.
//!
//! A component offers commands on *provided* interfaces and observes events
//! on *required* interfaces. Both map a name to a handler; payloads are
//! checked against the handler when a message is dispatched.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::SpeechError;
use crate::types::{ButtonEvent, ToneRequest};

/// Provided interface carrying the configuration commands.
pub const CONFIGURATION_INTERFACE: &str = "Configuration";
/// Provided interface carrying the speech commands.
pub const COMMANDS_INTERFACE: &str = "Commands";
/// Event name observed by button handlers.
pub const BUTTON_EVENT: &str = "Button";

// ============================================================================
// Payload
// ============================================================================

/// The value carried by a command or an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A flag, e.g. for `SetPreemptive`.
    Bool(bool),
    /// A string, text to speak or an interface name.
    Text(String),
    /// A single character.
    Character(char),
    /// A button event.
    Button(ButtonEvent),
    /// Duration, frequency and amplitude of a tone.
    Tone(ToneRequest),
}

impl Payload {
    /// Short kind name used in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Bool(_) => "bool",
            Payload::Text(_) => "text",
            Payload::Character(_) => "character",
            Payload::Button(_) => "button",
            Payload::Tone(_) => "tone",
        }
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Bool(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<char> for Payload {
    fn from(value: char) -> Self {
        Payload::Character(value)
    }
}

impl From<ButtonEvent> for Payload {
    fn from(value: ButtonEvent) -> Self {
        Payload::Button(value)
    }
}

impl From<ToneRequest> for Payload {
    fn from(value: ToneRequest) -> Self {
        Payload::Tone(value)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Commands a provided interface can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandHandler {
    /// Turn preemptive mode on or off.
    SetPreemptive,
    /// Add a required interface observing "Button" events.
    AddInterfaceRequiredForEventButton,
    /// Speak a string.
    StringToSpeech,
    /// Speak a single character.
    CharacterToSpeech,
    /// Play a tone.
    Beep,
}

impl CommandHandler {
    /// The command name the handler is registered under by default.
    pub fn command_name(self) -> &'static str {
        match self {
            CommandHandler::SetPreemptive => "SetPreemptive",
            CommandHandler::AddInterfaceRequiredForEventButton => {
                "AddInterfaceRequiredForEventButton"
            }
            CommandHandler::StringToSpeech => "StringToSpeech",
            CommandHandler::CharacterToSpeech => "CharacterToSpeech",
            CommandHandler::Beep => "Beep",
        }
    }

    /// The payload kind the handler accepts.
    pub fn payload_kind(self) -> &'static str {
        match self {
            CommandHandler::SetPreemptive => "bool",
            CommandHandler::AddInterfaceRequiredForEventButton | CommandHandler::StringToSpeech => {
                "text"
            }
            CommandHandler::CharacterToSpeech => "character",
            CommandHandler::Beep => "tone",
        }
    }
}

/// Handlers an event on a required interface can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandler {
    /// String payload, spoken as-is.
    String,
    /// Character payload, spoken as a one-character string.
    Character,
    /// Button payload, spoken as "pressed", "released" or "undefined".
    Button,
}

impl EventHandler {
    /// Handler name used in errors.
    pub fn name(self) -> &'static str {
        match self {
            EventHandler::String => "StringToSpeech",
            EventHandler::Character => "CharacterToSpeech",
            EventHandler::Button => "ButtonToSpeech",
        }
    }

    /// The payload kind the handler accepts.
    pub fn payload_kind(self) -> &'static str {
        match self {
            EventHandler::String => "text",
            EventHandler::Character => "character",
            EventHandler::Button => "button",
        }
    }
}

// ============================================================================
// Interfaces
// ============================================================================

/// A named set of commands offered to other components.
#[derive(Debug, Clone)]
pub struct InterfaceProvided {
    name: String,
    commands: BTreeMap<String, CommandHandler>,
}

impl InterfaceProvided {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: BTreeMap::new(),
        }
    }

    /// Interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `handler` under `command`.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::CommandExists` if the name is taken.
    pub fn register_command(
        &mut self,
        command: &str,
        handler: CommandHandler,
    ) -> Result<(), SpeechError> {
        if self.commands.contains_key(command) {
            return Err(SpeechError::CommandExists {
                interface: self.name.clone(),
                command: command.to_string(),
            });
        }
        self.commands.insert(command.to_string(), handler);
        Ok(())
    }

    /// Look up a command.
    pub fn command(&self, command: &str) -> Option<CommandHandler> {
        self.commands.get(command).copied()
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}

/// A named set of event handlers observing another component.
#[derive(Debug, Clone)]
pub struct InterfaceRequired {
    name: String,
    events: BTreeMap<String, EventHandler>,
}

impl InterfaceRequired {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: BTreeMap::new(),
        }
    }

    /// Interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observe `event` with `handler`, replacing any previous handler.
    pub fn subscribe_event(&mut self, event: &str, handler: EventHandler) {
        if let Some(previous) = self.events.insert(event.to_string(), handler) {
            debug!(
                interface = %self.name,
                event = event,
                previous = previous.name(),
                handler = handler.name(),
                "Replaced event handler"
            );
        }
    }

    /// Look up an event handler.
    pub fn event(&self, event: &str) -> Option<EventHandler> {
        self.events.get(event).copied()
    }

    /// Observed event names, sorted.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }
}

/// All interfaces of one component.
#[derive(Debug, Clone, Default)]
pub struct Interfaces {
    provided: BTreeMap<String, InterfaceProvided>,
    required: BTreeMap<String, InterfaceRequired>,
}

impl Interfaces {
    /// Add a provided interface.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::InterfaceExists` if the name is taken.
    pub fn add_provided(&mut self, name: &str) -> Result<&mut InterfaceProvided, SpeechError> {
        if self.provided.contains_key(name) {
            return Err(SpeechError::InterfaceExists {
                interface: name.to_string(),
            });
        }
        Ok(self
            .provided
            .entry(name.to_string())
            .or_insert_with(|| InterfaceProvided::new(name)))
    }

    /// Return the provided interface with that name, adding it if needed.
    pub fn ensure_provided(&mut self, name: &str) -> &mut InterfaceProvided {
        self.provided
            .entry(name.to_string())
            .or_insert_with(|| InterfaceProvided::new(name))
    }

    /// Add a required interface, or return the existing one with that name.
    pub fn add_required(&mut self, name: &str) -> &mut InterfaceRequired {
        self.required
            .entry(name.to_string())
            .or_insert_with(|| InterfaceRequired::new(name))
    }

    /// Get a provided interface.
    pub fn provided(&self, name: &str) -> Option<&InterfaceProvided> {
        self.provided.get(name)
    }

    /// Get a required interface.
    pub fn required(&self, name: &str) -> Option<&InterfaceRequired> {
        self.required.get(name)
    }

    /// Resolve a command on a provided interface.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::UnknownInterface` or `SpeechError::UnknownCommand`.
    pub fn resolve_command(
        &self,
        interface: &str,
        command: &str,
    ) -> Result<CommandHandler, SpeechError> {
        let provided = self
            .provided
            .get(interface)
            .ok_or_else(|| SpeechError::UnknownInterface {
                interface: interface.to_string(),
            })?;
        provided
            .command(command)
            .ok_or_else(|| SpeechError::UnknownCommand {
                interface: interface.to_string(),
                command: command.to_string(),
            })
    }

    /// Resolve an event handler on a required interface.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::UnknownInterface` or `SpeechError::UnknownEvent`.
    pub fn resolve_event(&self, interface: &str, event: &str) -> Result<EventHandler, SpeechError> {
        let required = self
            .required
            .get(interface)
            .ok_or_else(|| SpeechError::UnknownInterface {
                interface: interface.to_string(),
            })?;
        required.event(event).ok_or_else(|| SpeechError::UnknownEvent {
            interface: interface.to_string(),
            event: event.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
