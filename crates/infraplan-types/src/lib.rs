//! Shared domain types for infraplan.
//!
//! This crate contains the domain types used across the requirements-gathering
//! assistant: conversation state, session records, the question bank entry,
//! LLM request/response shapes, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, schemars.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod question;
pub mod session;
