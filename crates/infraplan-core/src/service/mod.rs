//! Business logic services (use cases).
//!
//! Services orchestrate the session store, the conversation drivers and the
//! BOQ renderer. They depend on traits (ports) -- never on concrete
//! infrastructure implementations.

pub mod conversation;

pub use conversation::{ConversationService, ServiceError, StepReport};
