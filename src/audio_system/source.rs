/// Sound categories and 3D placement
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sound categories handled by the audio system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// Streamed background music
    Bgm,

    /// Preloaded one-shot effect
    Sfx,

    /// Procedural effect played on the bus
    Sfxr,

    /// Synthesized speech
    Speech,
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundKind::Bgm => write!(f, "BGM"),
            SoundKind::Sfx => write!(f, "SFX"),
            SoundKind::Sfxr => write!(f, "Sfxr"),
            SoundKind::Speech => write!(f, "Speech"),
        }
    }
}

/// Emitter position, each axis nominally in -1.0..=1.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Clamp every axis into -1.0..=1.0
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(-1.0, 1.0),
            y: self.y.clamp(-1.0, 1.0),
            z: self.z.clamp(-1.0, 1.0),
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Listener ears on the X axis, centred on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listener {
    pub left_ear: [f32; 3],
    pub right_ear: [f32; 3],
}

impl Listener {
    pub fn with_ear_spacing(spacing: f32) -> Self {
        let half = spacing.abs() / 2.0;
        Self {
            left_ear: [-half, 0.0, 0.0],
            right_ear: [half, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_kind_display() {
        assert_eq!(SoundKind::Bgm.to_string(), "BGM");
        assert_eq!(SoundKind::Sfxr.to_string(), "Sfxr");
    }

    #[test]
    fn test_position_clamping() {
        let position = Position::new(1.5, -3.0, 0.25).clamped();
        assert_eq!(position, Position::new(1.0, -1.0, 0.25));
    }

    #[test]
    fn test_listener_ears_symmetric() {
        let listener = Listener::with_ear_spacing(0.2);
        assert_eq!(listener.left_ear, [-0.1, 0.0, 0.0]);
        assert_eq!(listener.right_ear, [0.1, 0.0, 0.0]);
    }
}
