//! State management for the Reversi server.
//!
//! This module provides the core state types and the service layer:
//!
//! - `board` - Pure board engine (cells, capture geometry, scoring)
//! - `game` - Immutable game snapshots and legal transitions
//! - `player` - Session-scoped player registry
//! - `room` - Room directory and player-to-room bindings
//! - `events` - Inbound command parsing and outbound event shapes
//! - `service` - Per-operation handlers and transport contracts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          GameService                             │
//! │                                                                  │
//! │  ┌──────────────────┐           ┌─────────────────────────────┐  │
//! │  │  PlayerRegistry  │           │        RoomRegistry         │  │
//! │  │                  │           │                             │  │
//! │  │ player_id →      │           │ room_id → Room              │  │
//! │  │   Player         │           │   players (≤ 2, colored)    │  │
//! │  │                  │           │   spectators                │  │
//! │  │                  │           │   game_state: GameState?    │  │
//! │  │                  │           │                             │  │
//! │  │                  │           │ player_id → room_id         │  │
//! │  └──────────────────┘           └─────────────────────────────┘  │
//! │                                                                  │
//! │  inbound ClientCommand ──▶ handler ──▶ new GameState snapshot    │
//! │        ──▶ SessionBroadcaster fan-out ──▶ ScoreRecorder          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every handler runs to completion before the next inbound event is
//! processed; game state only ever changes by whole-snapshot replacement.

pub mod board;
pub mod events;
pub mod game;
pub mod player;
pub mod room;
pub mod service;

// Re-export commonly used types
pub use board::{Board, Cell, Color, Grid, Outcome, Position, BOARD_SIZE};
pub use events::{ClientCommand, ErrorCode, ServerEvent};
pub use game::{GameError, GameState};
pub use player::{Player, PlayerRegistry};
pub use room::{
    JoinOutcome, LeaveOutcome, Room, RoomError, RoomRegistry, RoomSummary, MAX_ROOM_PLAYERS,
};
pub use service::{
    AutomationAdapter, FinalScore, GameService, ScoreRecorder, ServiceError, SessionBroadcaster,
};
