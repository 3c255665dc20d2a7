// src/cli/mod.rs
//! Command-line interface definitions
//!
//! One subcommand per verifier, plus `verify` for JSON requests, `bench` and
//! `config`.

/// Argument structs and request conversion
pub mod commands;

pub use commands::{
    Action, BenchOptions, BenchTarget, Commands, ConfigOptions, VerifyOptions,
};
