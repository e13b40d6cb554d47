//! Control panel for exercising an audio engine: streamed background
//! music, positioned one-shot effects, procedural retro effects on a
//! filtered bus, and game-controller triggering.

pub mod app;
pub mod audio_system;
pub mod config;
pub mod dialog;
pub mod error;
pub mod input;
pub mod messaging;
pub mod state;
pub mod stream_file;
