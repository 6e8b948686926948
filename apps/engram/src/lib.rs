//! # Engram - THE BINARY
//!
//! Library surface of the Engram CLI application. The binary entry point
//! lives in `main.rs`; the command implementations are exposed here so
//! integration tests can drive them directly.

pub mod cli;
