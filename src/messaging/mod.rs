/// Messaging module for Event/Command architecture
///
/// This module implements the Event/Command segregation pattern:
/// - **Commands**: Requests to perform actions (imperative, targeted)
/// - **Events**: Notifications of things that happened (past tense, broadcast)
///
/// ## Architecture
///
/// ```text
/// ┌──────────┐               ┌─────────┐     Command      ┌──────────┐     Event      ┌───────────┐
/// │ Console  │ ──RawEvent──> │ DemoApp │ ───────────────> │ Executor │ ─────────────> │ Event Bus │
/// │ Gamepad  │               │ (frame) │                  │          │                │           │
/// └──────────┘               └─────────┘                  └──────────┘                └───────────┘
///                                                              │
///                                                              ▼
///                                                     PanelState + AudioSystem
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let event_bus = EventBus::new();
/// let (rx, _id) = event_bus.subscribe();
///
/// let mut executor = CommandExecutor::new(event_bus.clone(), None, &config);
/// executor.execute(&mut state, "sfxr play 1".parse()?)?;
///
/// while let Ok(event) = rx.try_recv() {
///     println!("{}", event.description());
/// }
/// ```
pub mod bus;
pub mod commands;
pub mod events;
pub mod executor;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use commands::Command;
pub use events::Event;
pub use executor::CommandExecutor;
