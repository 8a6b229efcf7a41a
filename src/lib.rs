//! In-memory emulation of the system environment of a sandboxed component:
//! a virtual filesystem reached through capability descriptors, clocks,
//! seeded randomness, terminal output and command-line state.

#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod clocks;
pub mod config;
pub mod environment;
pub mod ext;
pub mod filesystem;
pub mod process;
pub mod random;
