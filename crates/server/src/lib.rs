//! Minesweeper server - shared board over a line-oriented TCP protocol
//!
//! Any number of clients connect at once and play on the same board; every
//! client sees the effects of the others.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects (default `127.0.0.1:4444`)
//! 2. **Greeting**: server sends one line with the board size and the number
//!    of connected players
//! 3. **Requests**: client sends one command per line, server answers each
//!
//! # Requests
//!
//! | Request | Response |
//! |---------|----------|
//! | `look` | the board |
//! | `dig X Y` | `BOOM!` if a mine was hit, otherwise the board |
//! | `flag X Y` / `mark X Y` | the board |
//! | `deflag X Y` / `unmark X Y` | the board |
//! | `help` | usage text |
//! | `bye` | none, the connection is closed |
//! | anything else | usage text |
//!
//! The board is `height` lines of `width` space-separated tokens: `-`
//! untouched, `F` flagged, ` ` dug with no mined neighbors, `1`-`8` dug with
//! that many mined neighbors.
//!
//! Unless the server runs in debug mode, a client is disconnected right after
//! its `BOOM!`.
//!
//! # Example Session
//!
//! ```text
//! Server -> Client: Welcome to Minesweeper. Board: 3 columns by 1 rows. Players: 1 including you. Type 'help' for help.
//! Client -> Server: dig 2 0
//! Server -> Client: - 1  
//! Client -> Server: dig 0 0
//! Server -> Client: BOOM!
//! ```
//!
//! # Environment Variables
//!
//! - `MINESWEEPER_HOST`: bind address (default: "127.0.0.1")
//! - `MINESWEEPER_PORT`: port number (default: 4444)
//! - `MINESWEEPER_DEBUG`: "1" or "true" keeps clients connected after `BOOM!`
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 4444
//! look
//! ```

pub mod connection;
pub mod protocol;
pub mod server;
pub mod session;

pub use minesweeper_core as core;
pub use minesweeper_types as types;

pub use connection::{handle_connection, SessionContext, SessionEnd};
pub use protocol::{respond, Request, Response};
pub use server::{run_server, Server, ServerConfig, ServerError};
pub use session::{SessionGuard, SessionRegistry};
