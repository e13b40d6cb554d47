/// Per-frame controller snapshot
///
/// Folds one frame's button releases and a fresh analog poll into a value
/// the frame logic inspects once.
use std::fmt;
use std::str::FromStr;

use crate::audio_system::Position;
use crate::error::CommandError;

/// Buttons reported by the controller backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerButton {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Misc,
}

impl FromStr for ControllerButton {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let button = match s.to_ascii_lowercase().as_str() {
            "a" => ControllerButton::A,
            "b" => ControllerButton::B,
            "x" => ControllerButton::X,
            "y" => ControllerButton::Y,
            "back" => ControllerButton::Back,
            "guide" => ControllerButton::Guide,
            "start" => ControllerButton::Start,
            "ls" | "leftstick" => ControllerButton::LeftStick,
            "rs" | "rightstick" => ControllerButton::RightStick,
            "lb" | "leftshoulder" => ControllerButton::LeftShoulder,
            "rb" | "rightshoulder" => ControllerButton::RightShoulder,
            "up" => ControllerButton::DPadUp,
            "down" => ControllerButton::DPadDown,
            "left" => ControllerButton::DPadLeft,
            "right" => ControllerButton::DPadRight,
            "misc" => ControllerButton::Misc,
            _ => {
                return Err(CommandError::InvalidValue {
                    argument: "button",
                    value: s.to_string(),
                })
            }
        };
        Ok(button)
    }
}

/// Analog axes the snapshot polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

/// A device that can be polled for analog axis readings
pub trait AxisSource {
    fn axis(&self, axis: ControllerAxis) -> i16;
}

/// The eight buttons that trigger sfxr slots, in firing priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappedButton {
    A,
    B,
    X,
    Y,
    Up,
    Down,
    Left,
    Right,
}

impl MappedButton {
    /// First match wins when several buttons were released in one frame.
    pub const PRIORITY: [MappedButton; 8] = [
        MappedButton::A,
        MappedButton::B,
        MappedButton::X,
        MappedButton::Y,
        MappedButton::Up,
        MappedButton::Down,
        MappedButton::Left,
        MappedButton::Right,
    ];

    pub fn from_button(button: ControllerButton) -> Option<Self> {
        match button {
            ControllerButton::A => Some(MappedButton::A),
            ControllerButton::B => Some(MappedButton::B),
            ControllerButton::X => Some(MappedButton::X),
            ControllerButton::Y => Some(MappedButton::Y),
            ControllerButton::DPadUp => Some(MappedButton::Up),
            ControllerButton::DPadDown => Some(MappedButton::Down),
            ControllerButton::DPadLeft => Some(MappedButton::Left),
            ControllerButton::DPadRight => Some(MappedButton::Right),
            _ => None,
        }
    }

    /// Index of the sfxr slot this button fires
    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn for_slot(slot: usize) -> Option<Self> {
        Self::PRIORITY.get(slot).copied()
    }
}

impl fmt::Display for MappedButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappedButton::A => "A",
            MappedButton::B => "B",
            MappedButton::X => "X",
            MappedButton::Y => "Y",
            MappedButton::Up => "Up",
            MappedButton::Down => "Down",
            MappedButton::Left => "Left",
            MappedButton::Right => "Right",
        };
        write!(f, "{}", name)
    }
}

/// Button releases and axis readings gathered during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerSnapshot {
    released: [bool; 8],
    pub x_axis: i16,
    pub y_axis: i16,
    /// Left trigger minus right trigger
    pub z_axis: i16,
}

impl ControllerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a button release. Unmapped buttons are ignored.
    pub fn update_button(&mut self, button: ControllerButton) {
        if let Some(mapped) = MappedButton::from_button(button) {
            self.released[mapped.slot()] = true;
        }
    }

    /// Re-sample the stick and trigger axes from the device.
    pub fn update_axis<D: AxisSource + ?Sized>(&mut self, device: &D) {
        self.x_axis = device.axis(ControllerAxis::LeftX);
        self.y_axis = device.axis(ControllerAxis::LeftY);
        self.z_axis = device
            .axis(ControllerAxis::TriggerLeft)
            .saturating_sub(device.axis(ControllerAxis::TriggerRight));
    }

    pub fn is_released(&self, button: MappedButton) -> bool {
        self.released[button.slot()]
    }

    /// The single button that fires this frame, if any.
    // TODO: revisit whether simultaneous releases should each fire their slot
    pub fn triggered(&self) -> Option<MappedButton> {
        MappedButton::PRIORITY
            .into_iter()
            .find(|button| self.is_released(*button))
    }

    /// Axis readings normalised to -1.0..=1.0
    pub fn position(&self) -> Position {
        let scale = i16::MAX as f32;
        Position::new(
            self.x_axis as f32 / scale,
            self.y_axis as f32 / scale,
            self.z_axis as f32 / scale,
        )
    }
}
