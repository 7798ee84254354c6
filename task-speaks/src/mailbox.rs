//! Queued delivery of commands and events to a component.
//!
//! Senders hold a [`ComponentHandle`]; the component owns the [`Mailbox`]
//! and drains it once per tick in FIFO order. Every message is also the
//! signal that wakes the component up.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::interface::{COMMANDS_INTERFACE, CONFIGURATION_INTERFACE, CommandHandler, Payload};
use crate::types::ToneRequest;

/// A queued command or event.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A command on one of the component's provided interfaces.
    Command {
        /// Provided interface name.
        interface: String,
        /// Command name.
        command: String,
        /// Command argument.
        payload: Payload,
    },
    /// An event observed through one of the component's required interfaces.
    Event {
        /// Required interface name.
        interface: String,
        /// Event name.
        event: String,
        /// Event payload.
        payload: Payload,
    },
}

/// Receiving end of a component's queue.
#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::UnboundedReceiver<Message>,
    queued: VecDeque<Message>,
}

impl Mailbox {
    /// Create a mailbox and the handle that feeds it.
    pub fn channel() -> (Mailbox, ComponentHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mailbox = Mailbox {
            rx,
            queued: VecDeque::new(),
        };
        (mailbox, ComponentHandle { tx })
    }

    /// Wait until at least one message is queued.
    ///
    /// Returns `false` once every handle is gone and the queue is empty.
    pub async fn wait(&mut self) -> bool {
        if !self.queued.is_empty() {
            return true;
        }
        match self.rx.recv().await {
            Some(message) => {
                self.queued.push_back(message);
                true
            }
            None => false,
        }
    }

    /// Queue a message from the owning component itself, behind everything
    /// already sent through a handle.
    pub fn push(&mut self, message: Message) {
        while let Ok(sent) = self.rx.try_recv() {
            self.queued.push_back(sent);
        }
        self.queued.push_back(message);
    }

    /// Next queued message without waiting.
    pub fn try_next(&mut self) -> Option<Message> {
        self.queued.pop_front().or_else(|| self.rx.try_recv().ok())
    }
}

/// Cloneable sender for a component's commands and events.
///
/// Sending never blocks. Messages sent after the component stopped are
/// dropped.
#[derive(Debug, Clone)]
pub struct ComponentHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl ComponentHandle {
    /// Queue a command on a provided interface.
    pub fn execute(&self, interface: &str, command: &str, payload: impl Into<Payload>) {
        self.send(Message::Command {
            interface: interface.to_string(),
            command: command.to_string(),
            payload: payload.into(),
        });
    }

    /// Deliver an event to a required interface.
    pub fn emit_event(&self, interface: &str, event: &str, payload: impl Into<Payload>) {
        self.send(Message::Event {
            interface: interface.to_string(),
            event: event.to_string(),
            payload: payload.into(),
        });
    }

    /// `Configuration::SetPreemptive`.
    pub fn set_preemptive(&self, preemptive: bool) {
        self.configure(CommandHandler::SetPreemptive, preemptive);
    }

    /// `Configuration::AddInterfaceRequiredForEventButton`.
    pub fn add_interface_required_for_event_button(&self, interface: &str) {
        self.configure(CommandHandler::AddInterfaceRequiredForEventButton, interface);
    }

    /// `Commands::StringToSpeech`.
    pub fn string_to_speech(&self, text: impl Into<String>) {
        let text: String = text.into();
        self.command(CommandHandler::StringToSpeech, text);
    }

    /// `Commands::CharacterToSpeech`.
    pub fn character_to_speech(&self, character: char) {
        self.command(CommandHandler::CharacterToSpeech, character);
    }

    /// `Commands::Beep`.
    pub fn beep(&self, tone: ToneRequest) {
        self.command(CommandHandler::Beep, tone);
    }

    /// `true` once the component has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn configure(&self, handler: CommandHandler, payload: impl Into<Payload>) {
        self.execute(CONFIGURATION_INTERFACE, handler.command_name(), payload);
    }

    fn command(&self, handler: CommandHandler, payload: impl Into<Payload>) {
        self.execute(COMMANDS_INTERFACE, handler.command_name(), payload);
    }

    fn send(&self, message: Message) {
        if self.tx.send(message).is_err() {
            tracing::debug!("Component stopped, message dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
