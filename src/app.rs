/// Frame logic
///
/// `DemoApp` owns all panel state. Each frame drains the raw input queue,
/// runs console commands in arrival order and, while controller triggering
/// is on, turns the frame's controller snapshot into playback commands.
use crossbeam_channel::Receiver;

use crate::audio_system::AudioSystem;
use crate::config::Config;
use crate::input::{AxisSource, ControllerSnapshot, RawEvent};
use crate::messaging::{Command, CommandExecutor, Event, EventBus};
use crate::state::PanelState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Quit,
}

/// Commands produced by one controller snapshot: the position update when
/// the axes were sampled, then at most one slot to fire.
pub fn plan_controller_frame(snapshot: &ControllerSnapshot, axes_sampled: bool) -> Vec<Command> {
    let mut commands = Vec::with_capacity(2);
    if axes_sampled {
        commands.push(Command::SetPosition {
            position: snapshot.position(),
        });
    }
    if let Some(button) = snapshot.triggered() {
        commands.push(Command::PlaySfxr {
            slot: button.slot(),
        });
    }
    commands
}

pub struct DemoApp {
    state: PanelState,
    executor: CommandExecutor,
    event_bus: EventBus,
    events: Receiver<RawEvent>,
}

impl DemoApp {
    pub fn new(config: &Config, audio: Option<AudioSystem>, events: Receiver<RawEvent>) -> Self {
        let event_bus = EventBus::new();
        if audio.is_none() {
            tracing::warn!("No audio output, running silently");
        }

        Self {
            state: PanelState::from_config(config),
            executor: CommandExecutor::new(event_bus.clone(), audio, config),
            event_bus,
            events,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Run one frame. `device` is polled for axes when a controller is
    /// connected and triggering is enabled.
    pub fn frame(&mut self, device: Option<&dyn AxisSource>) -> FrameOutcome {
        let mut snapshot = ControllerSnapshot::new();
        let pending: Vec<RawEvent> = self.events.try_iter().collect();

        for event in pending {
            match event {
                RawEvent::Quit | RawEvent::Console(Command::Quit) => return self.quit(),
                RawEvent::ControllerButtonUp(button) => snapshot.update_button(button),
                RawEvent::ControllerButtonDown(_) => {}
                RawEvent::ControllerAdded { name } => {
                    tracing::info!("Controller connected: {}", name);
                    self.state.controller_available = true;
                    self.event_bus.publish(Event::ControllerConnected { name });
                }
                RawEvent::ControllerRemoved => {
                    tracing::info!("Controller disconnected");
                    self.state.controller_available = false;
                    self.event_bus.publish(Event::ControllerDisconnected);
                }
                RawEvent::Console(command) => self.run(command),
            }
        }

        if self.state.use_controller {
            let device = if self.state.controller_active() {
                device
            } else {
                None
            };
            if let Some(device) = device {
                snapshot.update_axis(device);
            }
            for command in plan_controller_frame(&snapshot, device.is_some()) {
                self.run(command);
            }
        }

        FrameOutcome::Continue
    }

    /// Stop all audio and close both file readers
    pub fn shutdown(&mut self) {
        self.executor.shutdown();
    }

    fn quit(&mut self) -> FrameOutcome {
        self.run(Command::Quit);
        FrameOutcome::Quit
    }

    fn run(&mut self, command: Command) {
        let context = command.description();
        if let Err(e) = self.executor.execute(&mut self.state, command) {
            tracing::warn!("{} failed: {:#}", context, e);
            println!("{} failed: {:#}", context, e);
            self.event_bus.publish(Event::ErrorOccurred {
                message: format!("{:#}", e),
                context,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::Position;
    use crate::input::{ControllerAxis, ControllerButton};
    use crossbeam_channel::{unbounded, Sender};

    struct FixedPad(i16, i16, i16, i16);

    impl AxisSource for FixedPad {
        fn axis(&self, axis: ControllerAxis) -> i16 {
            match axis {
                ControllerAxis::LeftX => self.0,
                ControllerAxis::LeftY => self.1,
                ControllerAxis::TriggerLeft => self.2,
                ControllerAxis::TriggerRight => self.3,
                _ => 0,
            }
        }
    }

    fn app() -> (DemoApp, Sender<RawEvent>) {
        let (tx, rx) = unbounded();
        (DemoApp::new(&Config::default(), None, rx), tx)
    }

    fn played_slots(rx: &Receiver<Event>) -> Vec<usize> {
        rx.try_iter()
            .filter_map(|event| match event {
                Event::SfxrPlayed { slot, .. } => Some(slot),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plan_without_axes_only_fires() {
        let mut snapshot = ControllerSnapshot::new();
        snapshot.update_button(ControllerButton::Y);

        assert_eq!(
            plan_controller_frame(&snapshot, false),
            vec![Command::PlaySfxr { slot: 3 }]
        );
        assert!(plan_controller_frame(&ControllerSnapshot::new(), false).is_empty());
    }

    #[test]
    fn test_plan_moves_before_firing() {
        let mut snapshot = ControllerSnapshot::new();
        snapshot.update_button(ControllerButton::DPadLeft);
        snapshot.update_axis(&FixedPad(i16::MAX, 0, 0, 0));

        assert_eq!(
            plan_controller_frame(&snapshot, true),
            vec![
                Command::SetPosition {
                    position: Position::new(1.0, 0.0, 0.0)
                },
                Command::PlaySfxr { slot: 6 },
            ]
        );
    }

    #[test]
    fn test_presses_ignored_while_controller_off() {
        let (mut app, tx) = app();
        let (rx, _id) = app.event_bus().subscribe();

        tx.send(RawEvent::ControllerButtonUp(ControllerButton::A)).unwrap();
        assert_eq!(app.frame(None), FrameOutcome::Continue);
        assert!(played_slots(&rx).is_empty());
    }

    #[test]
    fn test_one_slot_fires_per_frame() {
        let (mut app, tx) = app();
        let (rx, _id) = app.event_bus().subscribe();

        tx.send(RawEvent::Console(Command::UseController { enabled: true }))
            .unwrap();
        tx.send(RawEvent::ControllerButtonUp(ControllerButton::DPadDown))
            .unwrap();
        tx.send(RawEvent::ControllerButtonUp(ControllerButton::X)).unwrap();
        app.frame(None);
        assert_eq!(played_slots(&rx), vec![2]);

        // flags do not carry over
        app.frame(None);
        assert!(played_slots(&rx).is_empty());
    }

    #[test]
    fn test_connected_pad_drives_position() {
        let (mut app, tx) = app();
        let pad = FixedPad(0, i16::MAX, 300, 100);

        tx.send(RawEvent::Console(Command::UseController { enabled: true }))
            .unwrap();
        app.frame(Some(&pad));
        assert_eq!(app.state().position, Position::default());

        tx.send(RawEvent::ControllerAdded {
            name: "Test Pad".to_string(),
        })
        .unwrap();
        app.frame(Some(&pad));

        let position = app.state().position;
        assert_eq!(position.x, 0.0);
        assert_eq!(position.y, 1.0);
        assert_eq!(position.z, 200.0 / i16::MAX as f32);
    }

    #[test]
    fn test_quit_stops_draining() {
        let (mut app, tx) = app();
        let (rx, _id) = app.event_bus().subscribe();

        tx.send(RawEvent::Quit).unwrap();
        tx.send(RawEvent::Console(Command::SetEcho { enabled: true }))
            .unwrap();

        assert_eq!(app.frame(None), FrameOutcome::Quit);
        assert!(!app.state().echo_enabled);
        assert_eq!(rx.try_recv().unwrap(), Event::Shutdown);
    }

    #[test]
    fn test_failed_command_publishes_error() {
        let (mut app, tx) = app();
        let (rx, _id) = app.event_bus().subscribe();

        tx.send(RawEvent::Console(Command::PlaySfx)).unwrap();
        app.frame(None);

        match rx.try_recv().unwrap() {
            Event::ErrorOccurred { context, .. } => assert_eq!(context, "Play SFX"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
