use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio_system::speech::{DECLINATION_RANGE, MAX_BASE_FREQ, SPEED_RANGE};
use crate::audio_system::{EchoParams, LofiParams, ReverbParams, SfxrPreset, SpeechParams};
use crate::error::ConfigError;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SFX_PANEL_CONFIG";

pub const SFXR_SLOT_COUNT: usize = 8;

/// Longest echo delay, in seconds; the delay line is allocated up front
pub const MAX_ECHO_DELAY_SECS: f32 = 10.0;

/// Startup settings for one sfxr slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotConfig {
    pub preset: SfxrPreset,

    /// Fixed seed; a random one is drawn at startup when absent
    #[serde(default)]
    pub seed: Option<i32>,

    #[serde(default)]
    pub lofi: bool,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            preset: SfxrPreset::Coin,
            seed: None,
            lofi: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial background music volume (0.0-1.0)
    pub bgm_volume: f32,

    /// Initial sfxr bus volume (0.0-1.0)
    pub bus_volume: f32,

    /// Distance between the listener's ears
    pub ear_spacing: f32,

    /// Output gain applied to every sfxr voice
    pub sfxr_master_volume: f32,

    /// Per-slot lo-fi filter settings
    pub lofi: LofiParams,

    /// Bus echo settings
    pub echo: EchoParams,

    /// Bus reverb settings
    pub reverb: ReverbParams,

    /// Initial speech volume (0.0-1.0)
    pub speech_volume: f32,

    /// Initial speech voice
    pub speech: SpeechParams,

    /// Delay between frames in milliseconds
    pub frame_interval_ms: u64,

    /// File extensions offered by the open dialogs
    pub audio_extensions: Vec<String>,

    /// Start with controller triggering enabled
    pub use_controller: bool,

    /// Initial sfxr slots; missing entries use the default slot
    pub sfxr_slots: Vec<SlotConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bgm_volume: 1.0,
            bus_volume: 1.0,
            ear_spacing: 0.2,
            sfxr_master_volume: 0.25,
            lofi: LofiParams::default(),
            echo: EchoParams::default(),
            reverb: ReverbParams::default(),
            speech_volume: 1.0,
            speech: SpeechParams::default(),
            frame_interval_ms: 16,
            audio_extensions: ["ogg", "wav", "mp3", "flac"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            use_controller: false,
            sfxr_slots: vec![SlotConfig::default(); SFXR_SLOT_COUNT],
        }
    }
}

impl Config {
    /// Load configuration from `SFX_PANEL_CONFIG` or the platform config
    /// directory. A missing file yields the defaults; nothing is written.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Ok(Config::default())
            }
            None => Ok(Config::default()),
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_err = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| load_err(Box::new(e)))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| load_err(Box::new(e)))?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("SfxPanel").join("config.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &str, value: f32| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must be within 0.0-1.0, got {}", name, value)))
            }
        };

        unit("bgm_volume", self.bgm_volume)?;
        unit("bus_volume", self.bus_volume)?;
        unit("sfxr_master_volume", self.sfxr_master_volume)?;
        unit("echo.decay", self.echo.decay)?;
        unit("reverb.room_size", self.reverb.room_size)?;
        unit("reverb.mix", self.reverb.mix)?;
        unit("speech_volume", self.speech_volume)?;

        if !(self.echo.delay > 0.0 && self.echo.delay <= MAX_ECHO_DELAY_SECS) {
            return Err(ConfigError::Invalid(format!(
                "echo.delay must be within 0-{} seconds, got {}",
                MAX_ECHO_DELAY_SECS, self.echo.delay
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame_interval_ms must be at least 1".to_string()));
        }
        if self.lofi.sample_rate <= 0.0 {
            return Err(ConfigError::Invalid("lofi.sample_rate must be positive".to_string()));
        }
        if !(1..=16).contains(&self.lofi.bit_depth) {
            return Err(ConfigError::Invalid(format!(
                "lofi.bit_depth must be within 1-16, got {}",
                self.lofi.bit_depth
            )));
        }
        if self.sfxr_slots.len() > SFXR_SLOT_COUNT {
            return Err(ConfigError::Invalid(format!(
                "at most {} sfxr slots, got {}",
                SFXR_SLOT_COUNT,
                self.sfxr_slots.len()
            )));
        }
        if self.speech.base_freq > MAX_BASE_FREQ {
            return Err(ConfigError::Invalid(format!(
                "speech.base_freq must be at most {}, got {}",
                MAX_BASE_FREQ, self.speech.base_freq
            )));
        }
        if !SPEED_RANGE.contains(&self.speech.speed) {
            return Err(ConfigError::Invalid(format!(
                "speech.speed must be within 0.1-30, got {}",
                self.speech.speed
            )));
        }
        if !DECLINATION_RANGE.contains(&self.speech.declination) {
            return Err(ConfigError::Invalid(format!(
                "speech.declination must be within -3-3, got {}",
                self.speech.declination
            )));
        }
        if self.audio_extensions.is_empty() {
            return Err(ConfigError::Invalid("audio_extensions is empty".to_string()));
        }

        Ok(())
    }
}
