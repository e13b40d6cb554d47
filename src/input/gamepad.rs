/// Controller backend on gilrs
///
/// Tracks the first connected pad; events from other pads are dropped.
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};

use super::{AxisSource, ControllerAxis, ControllerButton, RawEvent};
use crate::error::InputError;

pub struct GamepadInput {
    gilrs: Gilrs,
    active: Option<GamepadId>,
}

impl GamepadInput {
    pub fn new() -> Result<Self, InputError> {
        let gilrs = Gilrs::new().map_err(|e| InputError::BackendInitFailed(e.to_string()))?;
        let active = gilrs.gamepads().next().map(|(id, pad)| {
            tracing::info!("Using controller: {}", pad.name());
            id
        });
        Ok(Self { gilrs, active })
    }

    /// Name of the pad in use, if one is connected
    pub fn connected_name(&self) -> Option<String> {
        self.active
            .map(|id| self.gilrs.gamepad(id).name().to_string())
    }

    /// Move every pending driver event into `events`.
    pub fn drain(&mut self, events: &mut Vec<RawEvent>) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected if self.active.is_none() => {
                    self.active = Some(id);
                    let name = self.gilrs.gamepad(id).name().to_string();
                    events.push(RawEvent::ControllerAdded { name });
                }
                EventType::Disconnected if self.active == Some(id) => {
                    self.active = None;
                    events.push(RawEvent::ControllerRemoved);
                }
                EventType::ButtonReleased(button, _) if self.active == Some(id) => {
                    events.push(RawEvent::ControllerButtonUp(map_button(button)));
                }
                EventType::ButtonPressed(button, _) if self.active == Some(id) => {
                    events.push(RawEvent::ControllerButtonDown(map_button(button)));
                }
                _ => {}
            }
        }
    }
}

impl AxisSource for GamepadInput {
    fn axis(&self, axis: ControllerAxis) -> i16 {
        let Some(pad) = self.active.map(|id| self.gilrs.gamepad(id)) else {
            return 0;
        };
        let trigger = |button: Button| {
            pad.button_data(button)
                .map(|data| data.value())
                .unwrap_or(0.0)
        };

        match axis {
            ControllerAxis::LeftX => stick_to_i16(pad.value(Axis::LeftStickX)),
            // gilrs reports up as positive
            ControllerAxis::LeftY => stick_to_i16(-pad.value(Axis::LeftStickY)),
            ControllerAxis::RightX => stick_to_i16(pad.value(Axis::RightStickX)),
            ControllerAxis::RightY => stick_to_i16(-pad.value(Axis::RightStickY)),
            ControllerAxis::TriggerLeft => stick_to_i16(trigger(Button::LeftTrigger2)),
            ControllerAxis::TriggerRight => stick_to_i16(trigger(Button::RightTrigger2)),
        }
    }
}

fn stick_to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn map_button(button: Button) -> ControllerButton {
    match button {
        Button::South => ControllerButton::A,
        Button::East => ControllerButton::B,
        Button::West => ControllerButton::X,
        Button::North => ControllerButton::Y,
        Button::Select => ControllerButton::Back,
        Button::Mode => ControllerButton::Guide,
        Button::Start => ControllerButton::Start,
        Button::LeftThumb => ControllerButton::LeftStick,
        Button::RightThumb => ControllerButton::RightStick,
        Button::LeftTrigger => ControllerButton::LeftShoulder,
        Button::RightTrigger => ControllerButton::RightShoulder,
        Button::DPadUp => ControllerButton::DPadUp,
        Button::DPadDown => ControllerButton::DPadDown,
        Button::DPadLeft => ControllerButton::DPadLeft,
        Button::DPadRight => ControllerButton::DPadRight,
        _ => ControllerButton::Misc,
    }
}
