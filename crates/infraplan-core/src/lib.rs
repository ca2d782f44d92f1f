//! Conversation engine for infraplan.
//!
//! This crate defines the "ports" (LLM provider, session store, interactive
//! input) and the logic built on them: question bank, prompt builder, turn
//! processor, conversation drivers, BOQ renderer and the conversation
//! service. It depends only on `infraplan-types` -- never on
//! `infraplan-infra` or any network/IO crate.

pub mod boq;
pub mod conversation;
pub mod llm;
pub mod prompt;
pub mod questions;
pub mod service;
pub mod session;
pub mod turn;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
