//! Request types flowing from intake to the speech engine.
//!
//! - [`SpeechRequest`] is the normalized form every text, character and
//!   button request is turned into
//! - [`ToneRequest`] describes a beep
//! - [`PendingSlot`] holds the last request of each kind in preemptive mode

use serde::{Deserialize, Serialize};

// ============================================================================
// Button Events
// ============================================================================

/// The transition carried by a button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonTransition {
    /// The button went down.
    Pressed,
    /// The button went up.
    Released,
    /// A press immediately followed by a release.
    Clicked,
    /// Two clicks in quick succession.
    DoubleClicked,
    /// The source could not tell what happened.
    #[default]
    Undefined,
}

impl ButtonTransition {
    /// The literal text spoken for this transition.
    ///
    /// Only presses and releases have their own word, every other
    /// transition is spoken as "undefined".
    pub fn spoken_text(self) -> &'static str {
        match self {
            ButtonTransition::Pressed => "pressed",
            ButtonTransition::Released => "released",
            _ => "undefined",
        }
    }
}

/// A button event as delivered by a connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonEvent {
    /// What the button did.
    pub transition: ButtonTransition,
}

impl ButtonEvent {
    /// Create a button event for the given transition.
    pub fn new(transition: ButtonTransition) -> Self {
        Self { transition }
    }
}

// ============================================================================
// Speech Request
// ============================================================================

/// A single piece of text to be spoken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeechRequest {
    /// The text, passed verbatim to the engine.
    pub text: String,
}

impl SpeechRequest {
    /// Wrap a string as-is.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Wrap a single character into a one-character string.
    pub fn from_character(character: char) -> Self {
        Self {
            text: character.to_string(),
        }
    }

    /// Map a button event to "pressed", "released" or "undefined".
    pub fn from_button(button: &ButtonEvent) -> Self {
        Self::from_text(button.transition.spoken_text())
    }
}

// ============================================================================
// Tone Request
// ============================================================================

/// A beep described by duration, frequency and amplitude.
///
/// No range validation is performed, values are handed to the engine as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToneRequest {
    /// Duration in seconds.
    pub duration: f64,
    /// Frequency in Hz.
    pub frequency: f64,
    /// Amplitude, usually 0.0 to 1.0 (engine defined).
    pub amplitude: f64,
}

impl ToneRequest {
    /// Create a tone request.
    pub fn new(duration: f64, frequency: f64, amplitude: f64) -> Self {
        Self {
            duration,
            frequency,
            amplitude,
        }
    }
}

/// Build from `[duration, frequency, amplitude]`.
impl From<[f64; 3]> for ToneRequest {
    fn from(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

// ============================================================================
// Pending Slot
// ============================================================================

/// Last-value storage used when the component runs in preemptive mode.
///
/// Each kind keeps at most one value: absorbing a new request discards
/// the previous one. Presence is explicit, so an all-zero tone is a real
/// request and not "nothing pending".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PendingSlot {
    text: Option<String>,
    tone: Option<ToneRequest>,
}

impl PendingSlot {
    /// Forget both pending values.
    pub fn clear(&mut self) {
        self.text = None;
        self.tone = None;
    }

    /// Replace the pending text.
    pub fn absorb_text(&mut self, text: String) {
        self.text = Some(text);
    }

    /// Replace the pending tone.
    pub fn absorb_tone(&mut self, tone: ToneRequest) {
        self.tone = Some(tone);
    }

    /// Take the pending text if there is some and it is not empty.
    pub fn take_text(&mut self) -> Option<String> {
        self.text.take().filter(|text| !text.is_empty())
    }

    /// Take the pending tone.
    pub fn take_tone(&mut self) -> Option<ToneRequest> {
        self.tone.take()
    }

    /// `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.tone.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_have_their_own_words() {
        assert_eq!(ButtonTransition::Pressed.spoken_text(), "pressed");
        assert_eq!(ButtonTransition::Released.spoken_text(), "released");
    }

    #[test]
    fn test_other_transitions_are_undefined() {
        for transition in [
            ButtonTransition::Clicked,
            ButtonTransition::DoubleClicked,
            ButtonTransition::Undefined,
        ] {
            let request = SpeechRequest::from_button(&ButtonEvent::new(transition));
            assert_eq!(request.text, "undefined", "{transition:?}");
        }
    }

    #[test]
    fn test_character_matches_one_character_string() {
        for c in ['a', 'Z', ' ', '"', 'é', '世', '🚀'] {
            assert_eq!(
                SpeechRequest::from_character(c),
                SpeechRequest::from_text(String::from(c))
            );
        }
    }

    #[test]
    fn test_tone_from_array_keeps_order() {
        let tone = ToneRequest::from([0.5, 440.0, 0.8]);
        assert_eq!(tone.duration, 0.5);
        assert_eq!(tone.frequency, 440.0);
        assert_eq!(tone.amplitude, 0.8);
    }

    #[test]
    fn test_pending_slot_keeps_last_text() {
        let mut slot = PendingSlot::default();
        slot.absorb_text("a".into());
        slot.absorb_text("b".into());
        assert_eq!(slot.take_text().as_deref(), Some("b"));
        assert_eq!(slot.take_text(), None);
    }

    #[test]
    fn test_pending_slot_skips_empty_text() {
        let mut slot = PendingSlot::default();
        slot.absorb_text("a".into());
        slot.absorb_text(String::new());
        assert_eq!(slot.take_text(), None);
    }

    #[test]
    fn test_pending_slot_zero_tone_is_present() {
        let mut slot = PendingSlot::default();
        slot.absorb_tone(ToneRequest::default());
        assert!(!slot.is_empty());
        assert_eq!(slot.take_tone(), Some(ToneRequest::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_pending_slot_clear() {
        let mut slot = PendingSlot::default();
        slot.absorb_text("hello".into());
        slot.absorb_tone(ToneRequest::new(1.0, 220.0, 0.5));
        slot.clear();
        assert!(slot.is_empty());
    }
}
