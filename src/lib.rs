//! Reversi State Library
//!
//! This crate provides the session engine and room registry for a networked
//! Reversi (Othello) server.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Board Engine** - Pure 8x8 Reversi rules: move legality, capture
//!   resolution along all eight directions, scoring, and termination.
//!
//! - **Game Snapshots** - Immutable [`state::GameState`] values; every move
//!   or pass produces a fresh snapshot, installed by whole replacement.
//!
//! - **Room Registry** - Rooms with two seated players and unbounded
//!   spectators, plus the player-to-room index.
//!
//! - **Service Layer** - One handler per inbound operation, fanning
//!   committed state out through the [`state::SessionBroadcaster`] contract.
//!
//! # Design Principles
//!
//! 1. **Snapshots, not mutation** - A game transition either yields a
//!    complete new state or a structured error; boards are never edited in
//!    place.
//!
//! 2. **Registries provide indexed access** - Look up rooms by id or by
//!    occupant session.
//!
//! 3. **No networking** - This crate is pure state, no WebSocket or HTTP.
//!
//! 4. **Serialization-ready** - All types can be converted to JSON for
//!    clients.
//!
//! # Example
//!
//! ```rust
//! use reversi_state::state::{Color, GameState, Position};
//!
//! let opening = GameState::initial();
//! assert_eq!(opening.current_turn, Color::Black);
//! assert_eq!(opening.valid_moves.len(), 4);
//!
//! // Black plays one of the four opening moves.
//! let next = opening.apply_move(Position::new(2, 3), Color::Black).unwrap();
//! assert_eq!(next.black_score, 4);
//! assert_eq!(next.current_turn, Color::White);
//!
//! // The previous snapshot is untouched.
//! assert_eq!(opening.black_score, 2);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
