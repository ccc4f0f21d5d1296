//! simon-core: Pure game logic, no UI.
//!
//! This crate contains the sequence engine, the round controller and the
//! timer-driven game loop for a Simon-style memory game. It is completely
//! UI-agnostic; frontends subscribe to events via tokio::broadcast and send
//! commands over mpsc.

pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod game;
pub mod schedule;
pub mod sequence;
pub mod types;

pub use error::SequenceError;
pub use sequence::{advance_sequence, check_user_input, generate_sequence, sequence_length_for_level};
pub use types::{Color, InputResult, DEFAULT_PALETTE};
