//! YeetCode Companion
//!
//! Runtime wiring for the duel and ranking engine: configuration loading
//! and the developer harness used by the `yeetcode-companion` binary.

pub mod config;
pub mod harness;

pub use config::CompanionConfig;
pub use harness::{Collaborators, DemoReport, DevHarness, HarnessState, TickReport, DEMO_RIVAL};
