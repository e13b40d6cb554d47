/// Panel state
///
/// Everything the control panel displays and edits. Owned by the
/// application context; the audio system only ever sees copies of it.
use std::path::PathBuf;

use rand::Rng;

use crate::audio_system::{Position, SfxrPreset, SpeechParams};
use crate::config::{Config, SlotConfig, SFXR_SLOT_COUNT};
use crate::error::AudioError;
use crate::input::MappedButton;

/// One procedural effect slot, fired by a button or a controller press
#[derive(Debug, Clone, PartialEq)]
pub struct SfxrSlot {
    pub preset: SfxrPreset,
    pub seed: i32,
    pub lofi: bool,
}

impl SfxrSlot {
    pub fn from_config(config: &SlotConfig) -> Self {
        Self {
            preset: config.preset,
            seed: config.seed.unwrap_or_else(random_seed),
            lofi: config.lofi,
        }
    }

    pub fn randomize_seed(&mut self) {
        self.seed = random_seed();
    }
}

impl Default for SfxrSlot {
    fn default() -> Self {
        Self::from_config(&SlotConfig::default())
    }
}

fn random_seed() -> i32 {
    rand::thread_rng().gen()
}

/// Header text for a slot, naming the controller button that fires it
pub fn slot_label(slot: usize) -> String {
    match MappedButton::for_slot(slot) {
        Some(button) => format!("SFXR #{} - Controller {} Button", slot + 1, button),
        None => format!("SFXR #{}", slot + 1),
    }
}

#[derive(Debug, Clone)]
pub struct PanelState {
    // Background music
    pub bgm_path: Option<PathBuf>,
    pub bgm_volume: f32,
    pub bgm_playing: bool,

    // One-shot effect
    pub sfx_path: Option<PathBuf>,

    // Speech
    pub speech_text: String,
    pub speech_volume: f32,
    pub speech_pan: f32,
    pub speech: SpeechParams,

    // Sfxr bus
    pub sfxr_slots: Vec<SfxrSlot>,
    pub bus_volume: f32,
    pub echo_enabled: bool,
    pub reverb_enabled: bool,
    pub position: Position,

    // Controller
    pub use_controller: bool,
    pub controller_available: bool,
}

impl PanelState {
    pub fn from_config(config: &Config) -> Self {
        let mut sfxr_slots: Vec<SfxrSlot> =
            config.sfxr_slots.iter().map(SfxrSlot::from_config).collect();
        sfxr_slots.resize_with(SFXR_SLOT_COUNT, SfxrSlot::default);

        Self {
            bgm_path: None,
            bgm_volume: config.bgm_volume,
            bgm_playing: false,
            sfx_path: None,
            speech_text: String::new(),
            speech_volume: config.speech_volume,
            speech_pan: 0.0,
            speech: config.speech,
            sfxr_slots,
            bus_volume: config.bus_volume,
            echo_enabled: false,
            reverb_enabled: false,
            position: Position::default(),
            use_controller: config.use_controller,
            controller_available: false,
        }
    }

    pub fn slot(&self, index: usize) -> Result<&SfxrSlot, AudioError> {
        self.sfxr_slots.get(index).ok_or(AudioError::InvalidSlot(index))
    }

    pub fn slot_mut(&mut self, index: usize) -> Result<&mut SfxrSlot, AudioError> {
        self.sfxr_slots
            .get_mut(index)
            .ok_or(AudioError::InvalidSlot(index))
    }

    /// Whether controller presses should fire slots this frame
    pub fn controller_active(&self) -> bool {
        self.use_controller && self.controller_available
    }

    /// Multi-line summary printed by the console `status` command
    pub fn summary(&self) -> String {
        let path_or_none = |path: &Option<PathBuf>| {
            path.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        };
        let on_off = |flag: bool| if flag { "on" } else { "off" };

        let mut lines = vec![
            format!(
                "BGM: {} [{}] volume {:.2}",
                path_or_none(&self.bgm_path),
                if self.bgm_playing { "playing" } else { "stopped" },
                self.bgm_volume
            ),
            format!("SFX: {}", path_or_none(&self.sfx_path)),
            format!(
                "Speech: {:?} volume {:.2}, pan {:.2}, freq {}, speed {:.1}, declination {:.2}, {}",
                self.speech_text,
                self.speech_volume,
                self.speech_pan,
                self.speech.base_freq,
                self.speech.speed,
                self.speech.declination,
                self.speech.waveform
            ),
            format!(
                "Bus: volume {:.2}, echo {}, reverb {}, position {}",
                self.bus_volume,
                on_off(self.echo_enabled),
                on_off(self.reverb_enabled),
                self.position
            ),
            format!(
                "Controller: {} ({})",
                on_off(self.use_controller),
                if self.controller_available { "connected" } else { "not connected" }
            ),
        ];
        for (index, slot) in self.sfxr_slots.iter().enumerate() {
            lines.push(format!(
                "  {}: {} seed {} lo-fi {}",
                slot_label(index),
                slot.preset,
                slot.seed,
                on_off(slot.lofi)
            ));
        }
        lines.join("\n")
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
