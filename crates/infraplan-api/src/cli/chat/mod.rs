//! Interactive CLI interview for infraplan.
//!
//! Readline input, a thinking spinner, markdown rendering of each turn with
//! a progress line, and the welcome/closing banners. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod input;
pub mod loop_runner;
pub mod renderer;
