//! Conversation state machine.
//!
//! `driver` holds the two strategies (programmatic and interactive) behind
//! the `ConversationDriver` trait; `input` holds the interactive input port.

pub mod driver;
pub mod input;

pub use driver::{ConversationDriver, InteractiveDriver, ProgrammaticDriver, StepOutcome};
pub use input::{InputEvent, InteractiveIo};
