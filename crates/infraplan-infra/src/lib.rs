//! Infrastructure layer for infraplan.
//!
//! Contains the OpenAI / Azure OpenAI implementation of the `LlmProvider`
//! trait defined in `infraplan-core`, and the configuration and question
//! bank loaders.

pub mod config;
pub mod llm;
