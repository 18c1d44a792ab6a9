//! `puzzle-reseed` library crate.
//!
//! Gives puzzles still sitting at the default rating a fresh rating drawn
//! from a normal distribution. The binary (`reseed`) is a thin wrapper around
//! this library so the sampler and the sweep are testable without spawning
//! processes, and so other front-ends can drive a store of their own.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod reseed;
pub mod sampler;
pub mod store;
