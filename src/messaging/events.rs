/// Event types for the application
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.
use std::path::PathBuf;

use crate::audio_system::{Position, SfxrPreset};

/// Application events
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A music file was opened for streaming
    BgmLoaded { path: PathBuf },

    BgmStarted,

    BgmStopped,

    /// A one-shot effect was loaded into memory
    SfxLoaded { path: PathBuf, bytes: usize },

    SfxPlayed { position: Position },

    /// An sfxr slot fired on the bus
    SfxrPlayed {
        slot: usize,
        preset: SfxrPreset,
        seed: i32,
        position: Position,
    },

    /// An sfxr slot was rendered to a WAV file
    SfxrExported { slot: usize, path: PathBuf },

    /// An utterance started
    SpeechPlayed { text: String },

    /// Speech text, volume, pan or voice changed
    SpeechChanged,

    /// Preset, seed or lo-fi toggle of a slot changed
    SlotChanged { slot: usize },

    /// Bus volume or a bus filter changed
    BusChanged,

    PositionChanged { position: Position },

    ControllerConnected { name: String },

    ControllerDisconnected,

    /// An error occurred
    ErrorOccurred { message: String, context: String },

    /// Application is shutting down
    Shutdown,
}

impl Event {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            Event::BgmLoaded { path } => format!("BGM loaded: {}", path.display()),
            Event::BgmStarted => "BGM started".to_string(),
            Event::BgmStopped => "BGM stopped".to_string(),
            Event::SfxLoaded { path, bytes } => {
                format!("SFX loaded: {} ({} bytes)", path.display(), bytes)
            }
            Event::SfxPlayed { position } => format!("SFX played at {}", position),
            Event::SfxrPlayed {
                slot,
                preset,
                seed,
                position,
            } => format!(
                "Sfxr #{} played: {} seed {} at {}",
                slot + 1,
                preset,
                seed,
                position
            ),
            Event::SfxrExported { slot, path } => {
                format!("Sfxr #{} exported to {}", slot + 1, path.display())
            }
            Event::SpeechPlayed { text } => format!("Speech played: {:?}", text),
            Event::SpeechChanged => "Speech changed".to_string(),
            Event::SlotChanged { slot } => format!("Sfxr #{} changed", slot + 1),
            Event::BusChanged => "Bus changed".to_string(),
            Event::PositionChanged { position } => format!("Position changed: {}", position),
            Event::ControllerConnected { name } => format!("Controller connected: {}", name),
            Event::ControllerDisconnected => "Controller disconnected".to_string(),
            Event::ErrorOccurred { message, .. } => {
                format!("Error: {}", message)
            }
            Event::Shutdown => "Shutting down".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_description() {
        let event = Event::SfxrPlayed {
            slot: 2,
            preset: SfxrPreset::PowerUp,
            seed: 9,
            position: Position::new(0.0, 0.5, 0.0),
        };
        assert_eq!(
            event.description(),
            "Sfxr #3 played: Power Up seed 9 at (0.00, 0.50, 0.00)"
        );

        assert_eq!(Event::Shutdown.description(), "Shutting down");
        assert_eq!(
            Event::SpeechPlayed {
                text: "hi there".to_string()
            }
            .description(),
            "Speech played: \"hi there\""
        );
    }
}
