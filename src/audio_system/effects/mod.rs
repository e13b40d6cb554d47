/// Audio filters
///
/// Source adapters applied per voice (lo-fi) or on the sfxr bus
/// (echo, reverb, level meter). Bus filters share an enable flag with the
/// panel so they can be toggled while the bus keeps playing.

pub mod echo;
pub mod lofi;
pub mod meter;
pub mod reverb;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use echo::{EchoFilter, EchoParams};
pub use lofi::{LofiFilter, LofiParams};
pub use meter::{LevelMeter, LevelReading, LevelTap};
pub use reverb::{ReverbFilter, ReverbParams};

/// Enable flag shared between the panel and a running filter
#[derive(Debug, Clone, Default)]
pub struct FilterToggle(Arc<AtomicBool>);

impl FilterToggle {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
