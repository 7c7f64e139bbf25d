//! Domain types shared across the engine.

pub mod client;

pub use client::{Client, ClientType};
