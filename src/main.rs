//! Multiplayer Minesweeper server (default binary).
//!
//! ```text
//! minesweeper-server [--debug | --no-debug] [--port PORT] [--size X,Y | --file FILE]
//! ```
//!
//! With neither `--size` nor `--file`, a random 10x10 board is generated.
//! Flags override the `MINESWEEPER_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use minesweeper::core::{Board, Grid, RandomMines};
use minesweeper::server::{Server, ServerConfig, ServerError};
use minesweeper::types::{DEFAULT_MINE_PROBABILITY, DEFAULT_SIZE};

#[derive(Parser, Debug)]
#[command(name = "minesweeper-server", version, about = "Multiplayer Minesweeper server")]
struct Cli {
    /// Keep clients connected after they dig a mine.
    #[arg(long, overrides_with = "no_debug")]
    debug: bool,

    /// Disconnect clients after they dig a mine (default).
    #[arg(long, overrides_with = "debug")]
    no_debug: bool,

    /// Address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on; 0 picks any free port.
    #[arg(long)]
    port: Option<u16>,

    /// Generate a random board of X columns by Y rows.
    #[arg(long, value_name = "X,Y", conflicts_with = "file")]
    size: Option<BoardSize>,

    /// Load the starting board from FILE.
    #[arg(long, value_name = "FILE", value_parser = existing_file)]
    file: Option<PathBuf>,

    /// Seed for the random board.
    #[arg(long)]
    seed: Option<u64>,

    /// Probability of a mine on each cell of a random board.
    #[arg(long, default_value_t = DEFAULT_MINE_PROBABILITY, value_parser = probability)]
    mine_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoardSize {
    width: u32,
    height: u32,
}

impl FromStr for BoardSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got {s:?}"))?;
        let parse = |v: &str| match v.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("{v:?} is not a positive integer")),
        };
        Ok(Self {
            width: parse(x)?,
            height: parse(y)?,
        })
    }
}

fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("file not found: {s:?}"))
    }
}

fn probability(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(p) if (0.0..=1.0).contains(&p) => Ok(p),
        _ => Err(format!("{s:?} is not a probability between 0 and 1")),
    }
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.debug {
            config.debug = true;
        } else if self.no_debug {
            config.debug = false;
        }
        config
    }

    fn initial_grid(&self) -> Result<Grid> {
        if let Some(path) = &self.file {
            return Grid::load(path)
                .with_context(|| format!("improper board file {}", path.display()));
        }

        let size = self.size.unwrap_or(BoardSize {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
        });
        let mut mines = match self.seed {
            Some(seed) => RandomMines::new(self.mine_probability, seed),
            None => RandomMines::from_entropy(self.mine_probability),
        };
        Grid::random(size.width, size.height, &mut mines).context("invalid board size")
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.server_config();
    let grid = cli.initial_grid()?;
    info!(
        width = grid.width(),
        height = grid.height(),
        mines = grid.mine_count(),
        "board ready"
    );

    let board = Arc::new(Board::new(grid));
    let server = Server::bind(&config, board)
        .await
        .with_context(|| format!("failed to listen on {}:{}", config.host, config.port))?;
    let server = Arc::new(server);
    if server.is_debug() {
        warn!(addr = %server.local_addr(), "debug mode: clients stay connected after BOOM!");
    }

    {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, no longer accepting clients");
                server.terminate();
            }
        });
    }

    match server.serve().await {
        Ok(()) | Err(ServerError::Terminated) => {
            info!(
                mines_left = server.board().snapshot().mine_count(),
                "server terminated"
            );
            Ok(())
        }
        Err(e) => Err(e).context("server stopped"),
    }
}
