//! Session storage: the `SessionStore` port and its in-process implementation.

pub mod memory;
pub mod store;

pub use memory::InMemorySessionStore;
pub use store::{SessionLease, SessionStore};
