/// Input module
///
/// Raw events from the console panel and the controller driver are pushed
/// onto one channel and folded into a per-frame snapshot by the frame loop.
pub mod console;
#[cfg(feature = "gamepad")]
pub mod gamepad;
pub mod snapshot;

pub use snapshot::{AxisSource, ControllerAxis, ControllerButton, ControllerSnapshot, MappedButton};

use crate::messaging::Command;

/// One raw input event, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    Quit,
    ControllerButtonUp(ControllerButton),
    ControllerButtonDown(ControllerButton),
    ControllerAdded { name: String },
    ControllerRemoved,
    /// A command typed on the console panel
    Console(Command),
}
