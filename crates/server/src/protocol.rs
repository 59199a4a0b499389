//! Protocol module - the line-oriented text protocol
//!
//! One request per line, one response per request. Requests are
//! case-sensitive, use single spaces between tokens and must have exactly
//! the arity of their verb:
//!
//! ```text
//! REQUEST ::= "look" | "help" | "bye" | VERB " " INT " " INT
//! VERB    ::= "dig" | "flag" | "mark" | "deflag" | "unmark"
//! INT     ::= "-"? [0-9]+
//! ```
//!
//! Anything else is answered with [`HELP_MESSAGE`](crate::types::HELP_MESSAGE).

use std::fmt;

use crate::core::Board;
use crate::types::{Coord, BOOM_MESSAGE, HELP_MESSAGE};

/// A parsed client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    Look,
    Help,
    Bye,
    Dig { x: Coord, y: Coord },
    /// Also accepted as `mark`.
    Flag { x: Coord, y: Coord },
    /// Also accepted as `unmark`.
    Deflag { x: Coord, y: Coord },
}

impl Request {
    /// Parse one line (without its terminator).
    ///
    /// Returns `None` for anything outside the grammar, including coordinates
    /// that do not fit a [`Coord`].
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split(' ').collect();
        let request = match tokens.as_slice() {
            ["look"] => Request::Look,
            ["help"] => Request::Help,
            ["bye"] => Request::Bye,
            [verb, x, y] => {
                let x = parse_coord(x)?;
                let y = parse_coord(y)?;
                match *verb {
                    "dig" => Request::Dig { x, y },
                    "flag" | "mark" => Request::Flag { x, y },
                    "deflag" | "unmark" => Request::Deflag { x, y },
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(request)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Look => f.write_str("look"),
            Request::Help => f.write_str("help"),
            Request::Bye => f.write_str("bye"),
            Request::Dig { x, y } => write!(f, "dig {} {}", x, y),
            Request::Flag { x, y } => write!(f, "flag {} {}", x, y),
            Request::Deflag { x, y } => write!(f, "deflag {} {}", x, y),
        }
    }
}

fn parse_coord(token: &str) -> Option<Coord> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// What the server sends back for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Rendered board, possibly spanning several lines.
    Board(String),
    Help,
    Boom,
    /// End the session without a reply.
    Bye,
}

impl Response {
    /// Text to send, or `None` when the session ends silently.
    pub fn text(&self) -> Option<&str> {
        match self {
            Response::Board(text) => Some(text),
            Response::Help => Some(HELP_MESSAGE),
            Response::Boom => Some(BOOM_MESSAGE),
            Response::Bye => None,
        }
    }

    /// Whether the connection closes after this response.
    pub fn ends_session(&self, debug: bool) -> bool {
        match self {
            Response::Bye => true,
            Response::Boom => !debug,
            Response::Board(_) | Response::Help => false,
        }
    }
}

/// Apply one raw request line to the board.
///
/// The board lock is taken once for the mutation and once more for the
/// rendering; other connections may act in between.
pub fn respond(board: &Board, line: &str) -> Response {
    let Some(request) = Request::parse(line) else {
        return Response::Help;
    };
    match request {
        Request::Look => Response::Board(board.render()),
        Request::Help => Response::Help,
        Request::Bye => Response::Bye,
        Request::Dig { x, y } => {
            if board.reveal(x, y) {
                Response::Boom
            } else {
                Response::Board(board.render())
            }
        }
        Request::Flag { x, y } => {
            board.mark(x, y);
            Response::Board(board.render())
        }
        Request::Deflag { x, y } => {
            board.unmark(x, y);
            Response::Board(board.render())
        }
    }
}
