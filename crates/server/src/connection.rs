//! Per-connection request loop.
//!
//! A session greets the client, then answers one line at a time until the
//! client says `bye`, closes its side, digs a mine while the server is not in
//! debug mode, or the stream fails. The handler is generic over the stream
//! so it can run on a `TcpStream` as well as on in-memory pipes.
//!
//! Lines are decoded lossily: bytes that are not UTF-8 become U+FFFD and the
//! line is answered like any other malformed request. Lines longer than
//! [`MAX_LINE_BYTES`] are discarded and answered with help.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::core::Board;
use crate::protocol::{respond, Response};
use crate::session::SessionRegistry;
use crate::types::hello_message;

/// Longest request line, terminator included, that is read as a request.
pub const MAX_LINE_BYTES: u64 = 1024;

/// Everything a session shares with the rest of the server.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub board: Arc<Board>,
    pub sessions: SessionRegistry,
    /// Keep connections open after an explosion.
    pub debug: bool,
}

/// Why a session ended without an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client sent `bye`.
    Bye,
    /// Client closed its side of the stream.
    Eof,
    /// Client dug a mine with debug mode off.
    Exploded,
}

/// Run one client session to completion.
///
/// The session counts as active from before the greeting until this future
/// completes or is dropped. The stream is shut down on every exit path.
pub async fn handle_connection<S>(stream: S, context: &SessionContext) -> std::io::Result<SessionEnd>
where
    S: AsyncRead + AsyncWrite,
{
    let _session = context.sessions.enter();

    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    let outcome = run_session(&mut reader, &mut writer, context).await;
    let _ = writer.shutdown().await;
    outcome
}

async fn run_session<R, W>(
    reader: &mut BufReader<R>,
    writer: &mut W,
    context: &SessionContext,
) -> std::io::Result<SessionEnd>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let board = &context.board;
    let hello = hello_message(board.width(), board.height(), context.sessions.active());
    write_line(writer, &hello).await?;

    let mut buf = Vec::new();
    loop {
        let response = match read_request(reader, &mut buf).await? {
            Incoming::Closed => return Ok(SessionEnd::Eof),
            Incoming::Overlong => {
                debug!(limit = MAX_LINE_BYTES, "request line too long");
                Response::Help
            }
            Incoming::Line(line) => {
                let request = line.trim_end_matches(['\n', '\r']);
                let response = respond(board, request);
                debug!(request, ?response, "handled request");
                response
            }
        };

        if let Some(text) = response.text() {
            write_line(writer, text).await?;
        }
        if response.ends_session(context.debug) {
            return Ok(match response {
                Response::Bye => SessionEnd::Bye,
                _ => SessionEnd::Exploded,
            });
        }
    }
}

enum Incoming {
    Line(String),
    Overlong,
    Closed,
}

/// Read one line of at most [`MAX_LINE_BYTES`] into `buf`.
///
/// The rest of an overlong line is consumed in bounded chunks and dropped.
async fn read_request<R>(reader: &mut BufReader<R>, buf: &mut Vec<u8>) -> std::io::Result<Incoming>
where
    R: AsyncRead + Unpin,
{
    buf.clear();
    let n = (&mut *reader).take(MAX_LINE_BYTES).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(Incoming::Closed);
    }
    if buf.last() == Some(&b'\n') || (n as u64) < MAX_LINE_BYTES {
        return Ok(Incoming::Line(String::from_utf8_lossy(buf).into_owned()));
    }

    loop {
        buf.clear();
        let n = (&mut *reader).take(MAX_LINE_BYTES).read_until(b'\n', buf).await?;
        if n == 0 || buf.last() == Some(&b'\n') {
            return Ok(Incoming::Overlong);
        }
    }
}

async fn write_line<W>(writer: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(text.len() + 1);
    buf.extend_from_slice(text.as_bytes());
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Grid;
    use crate::types::{BOOM_MESSAGE, HELP_MESSAGE};
    use tokio::io::{duplex, DuplexStream, Lines, ReadHalf};

    fn context(layout: (u32, u32, &str), debug: bool) -> SessionContext {
        let (width, height, rows) = layout;
        SessionContext {
            board: Arc::new(Board::new(Grid::from_layout(width, height, rows).unwrap())),
            sessions: SessionRegistry::new(),
            debug,
        }
    }

    async fn next(lines: &mut Lines<BufReader<ReadHalf<DuplexStream>>>) -> Option<String> {
        lines.next_line().await.unwrap()
    }

    #[tokio::test]
    async fn greets_then_answers_until_bye() {
        let ctx = context((2, 1, "0 1"), false);
        let (client, server) = duplex(1024);
        let session = tokio::spawn({
            let ctx = ctx.clone();
            async move { handle_connection(server, &ctx).await }
        });

        let (read, mut write) = tokio::io::split(client);
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"look\r\nhelp\nflag 0 0\nbye\n").await.unwrap();

        let hello = next(&mut lines).await.unwrap();
        assert!(hello.starts_with("Welcome to Minesweeper. Board: 2 columns by 1 rows. Players: 1"));
        assert_eq!(next(&mut lines).await.unwrap(), "- -");
        assert_eq!(next(&mut lines).await.unwrap(), HELP_MESSAGE);
        assert_eq!(next(&mut lines).await.unwrap(), "F -");
        assert_eq!(next(&mut lines).await, None);

        assert_eq!(session.await.unwrap().unwrap(), SessionEnd::Bye);
        assert_eq!(ctx.sessions.active(), 0);
    }

    #[tokio::test]
    async fn explosion_ends_session_unless_debug() {
        let ctx = context((1, 1, "1"), false);
        let (client, server) = duplex(1024);
        let session = tokio::spawn({
            let ctx = ctx.clone();
            async move { handle_connection(server, &ctx).await }
        });

        let (read, mut write) = tokio::io::split(client);
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"dig 0 0\nlook\n").await.unwrap();

        next(&mut lines).await.unwrap();
        assert_eq!(next(&mut lines).await.unwrap(), BOOM_MESSAGE);
        assert_eq!(next(&mut lines).await, None);
        assert_eq!(session.await.unwrap().unwrap(), SessionEnd::Exploded);
    }

    #[tokio::test]
    async fn debug_mode_survives_explosion() {
        let ctx = context((1, 1, "1"), true);
        let (client, server) = duplex(1024);
        let session = tokio::spawn({
            let ctx = ctx.clone();
            async move { handle_connection(server, &ctx).await }
        });

        let (read, mut write) = tokio::io::split(client);
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"dig 0 0\nlook\n").await.unwrap();

        next(&mut lines).await.unwrap();
        assert_eq!(next(&mut lines).await.unwrap(), BOOM_MESSAGE);
        assert_eq!(next(&mut lines).await.unwrap(), " ");

        drop(write);
        assert_eq!(session.await.unwrap().unwrap(), SessionEnd::Eof);
    }

    #[tokio::test]
    async fn invalid_utf8_gets_help_and_keeps_session() {
        let ctx = context((1, 1, "0"), false);
        let (client, server) = duplex(1024);
        let session = tokio::spawn({
            let ctx = ctx.clone();
            async move { handle_connection(server, &ctx).await }
        });

        let (read, mut write) = tokio::io::split(client);
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"dig \xff 0\n\xff\xfe\r\nlook\n").await.unwrap();

        next(&mut lines).await.unwrap();
        assert_eq!(next(&mut lines).await.unwrap(), HELP_MESSAGE);
        assert_eq!(next(&mut lines).await.unwrap(), HELP_MESSAGE);
        assert_eq!(next(&mut lines).await.unwrap(), "-");
        assert_eq!(ctx.sessions.active(), 1);

        drop(write);
        assert_eq!(session.await.unwrap().unwrap(), SessionEnd::Eof);
        assert_eq!(ctx.sessions.active(), 0);
    }

    #[tokio::test]
    async fn overlong_line_gets_help() {
        let ctx = context((1, 1, "0"), false);
        let (client, server) = duplex(4096);
        let session = tokio::spawn({
            let ctx = ctx.clone();
            async move { handle_connection(server, &ctx).await }
        });

        let (read, mut write) = tokio::io::split(client);
        let mut lines = BufReader::new(read).lines();
        let mut input = vec![b'x'; 3 * MAX_LINE_BYTES as usize];
        input.extend_from_slice(b"\nlook\nbye\n");
        write.write_all(&input).await.unwrap();

        next(&mut lines).await.unwrap();
        assert_eq!(next(&mut lines).await.unwrap(), HELP_MESSAGE);
        assert_eq!(next(&mut lines).await.unwrap(), "-");
        assert_eq!(next(&mut lines).await, None);
        assert_eq!(session.await.unwrap().unwrap(), SessionEnd::Bye);
    }

    #[tokio::test]
    async fn line_of_exactly_the_limit_is_a_request() {
        let ctx = context((1, 1, "0"), false);
        let (client, server) = duplex(4096);
        let session = tokio::spawn({
            let ctx = ctx.clone();
            async move { handle_connection(server, &ctx).await }
        });

        let (read, mut write) = tokio::io::split(client);
        let mut lines = BufReader::new(read).lines();
        // "look" padded to the limit is still malformed, but must be read as
        // one line and not swallow the following request.
        let mut input = vec![b' '; MAX_LINE_BYTES as usize - 1];
        input[..4].copy_from_slice(b"look");
        input.extend_from_slice(b"\nbye\n");
        write.write_all(&input).await.unwrap();

        next(&mut lines).await.unwrap();
        assert_eq!(next(&mut lines).await.unwrap(), HELP_MESSAGE);
        assert_eq!(next(&mut lines).await, None);
        assert_eq!(session.await.unwrap().unwrap(), SessionEnd::Bye);
    }
}
