//! Multiplayer Minesweeper (workspace facade crate).
//!
//! Re-exports the member crates under one roof:
//! `minesweeper::{core, server, types}`.

pub use minesweeper_core as core;
pub use minesweeper_server as server;
pub use minesweeper_types as types;
