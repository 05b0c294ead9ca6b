use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use tracing::{info, warn};

use tracing_subscriber::{EnvFilter, fmt::MakeWriter};

use quoridor_mcts::{
    commands::get_human_move,
    config::{AppConfig, load_config},
    data_model::{BoardState, Edge, Player},
    game_logic::{apply_edge, child_states, winner},
    mcts::{MctsConfig, MctsSearch, MemoryStore},
    player_type::PlayerType,
    render_board::render_board,
};

#[derive(clap_derive::Parser, Debug)]
#[clap(about = "Quoridor with a Monte-Carlo tree search opponent")]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Statistics snapshot file, overriding the configured one.
    #[clap(long, global = true)]
    snapshot: Option<PathBuf>,
}

#[derive(clap_derive::Subcommand, Debug)]
enum Command {
    /// Play a game in the terminal.
    Play {
        #[clap(short = 'a', long, default_value_t = PlayerType::Human)]
        player1: PlayerType,

        #[clap(short = 'b', long, default_value_t = PlayerType::Bot)]
        player2: PlayerType,

        /// Search passes per bot move.
        #[clap(short, long)]
        passes: Option<u64>,

        #[clap(short, long)]
        end_after_moves: Option<usize>,

        /// Seed for the random player.
        #[clap(short, long)]
        seed: Option<u64>,
    },
    /// Grow the statistics for one position and print the best move.
    Search {
        /// Passes to run; 0 runs until interrupted.
        #[clap(short, long)]
        passes: Option<u64>,

        /// Canonical key of the position to search from.
        #[clap(short, long)]
        board: Option<String>,
    },
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Subscriber for messages emitted while the configuration, and with it the
/// log level, is still being read.
fn startup_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .finish()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config =
        tracing::subscriber::with_default(startup_subscriber(std::io::stdout), load_config);
    if let Some(snapshot) = args.snapshot {
        config.store.snapshot_path = Some(snapshot);
    }
    init_tracing(&config.log_level);
    info!(?config, "configuration loaded");

    let store = Arc::new(match &config.store.snapshot_path {
        Some(path) => MemoryStore::load_snapshot(path)
            .with_context(|| format!("loading snapshot {}", path.display()))?,
        None => MemoryStore::new(),
    });

    match args.command {
        Command::Play {
            player1,
            player2,
            passes,
            end_after_moves,
            seed,
        } => {
            let mut mcts = config.mcts.clone();
            if let Some(passes) = passes {
                mcts.num_passes = passes;
            }
            if mcts.num_passes == 0 {
                mcts.num_passes = MctsConfig::default().num_passes;
                warn!(
                    passes = mcts.num_passes,
                    "bot moves need a pass limit, using the default"
                );
            }
            let player_type = |p: Player| match p {
                Player::Player1 => player1,
                Player::Player2 => player2,
            };
            let mut search = MctsSearch::new(store.clone(), mcts);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            play(&mut search, &mut rng, player_type, end_after_moves).await?;
        }
        Command::Search { passes, board } => {
            let mut mcts = config.mcts.clone();
            if let Some(passes) = passes {
                mcts.num_passes = passes;
            }
            let mut search = MctsSearch::new(store.clone(), mcts);
            if let Some(key) = board {
                let state = BoardState::from_key(&key).context("invalid board key")?;
                search.set_root(state);
            }
            println!("{}", render_board(search.root()));

            let stop = search.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received, finishing the current pass");
                    stop.store(true, Ordering::Relaxed);
                }
            });

            let summary = search.search().await?;
            let best = search.current_best_move().await?;
            println!(
                "Best move: {} after {} passes ({} won, {} lost, {} drawn)",
                best, summary.passes, summary.wins, summary.losses, summary.draws
            );
        }
    }

    save_snapshot(&config, &store)
}

async fn play(
    search: &mut MctsSearch,
    rng: &mut StdRng,
    player_type: impl Fn(Player) -> PlayerType,
    end_after_moves: Option<usize>,
) -> Result<()> {
    let mut state = BoardState::initial();
    for move_number in 0.. {
        if let Some(player) = winner(&state) {
            println!("{}", render_board(&state));
            println!("{player} wins after {move_number} moves.");
            break;
        }
        if let Some(end_after_moves) = end_after_moves {
            if move_number >= end_after_moves {
                break;
            }
        }
        let player = state.current_player;
        println!("{}", render_board(&state));
        println!(
            "{} ({}) to move. Walls: 1: {}, 2: {}",
            player,
            player_type(player),
            state.player1.wall_count,
            state.player2.wall_count
        );
        let edge = match player_type(player) {
            PlayerType::Human => get_human_move(&state)?,
            PlayerType::Bot => get_bot_move(search, &state).await?,
            PlayerType::Random => get_random_move(&state, rng)?,
        };
        println!("{player} plays {edge}");
        state = apply_edge(&state, edge)?;
    }
    Ok(())
}

async fn get_bot_move(search: &mut MctsSearch, state: &BoardState) -> Result<Edge> {
    let start_time = std::time::Instant::now();
    search.set_root(state.clone());
    let summary = search.search().await?;
    let best_move = search.current_best_move().await?;
    let elapsed = start_time.elapsed();
    println!(
        "Best move: {} after {} passes (took {:?})",
        best_move, summary.passes, elapsed
    );
    Ok(best_move)
}

fn get_random_move(state: &BoardState, rng: &mut StdRng) -> Result<Edge> {
    let edges: Vec<Edge> = child_states(state)
        .into_iter()
        .map(|(_, edge)| edge)
        .collect();
    edges.choose(rng).copied().context("no legal action left")
}

fn save_snapshot(config: &AppConfig, store: &MemoryStore) -> Result<()> {
    if let Some(path) = &config.store.snapshot_path {
        store
            .save_snapshot(path)
            .with_context(|| format!("saving snapshot {}", path.display()))?;
        info!(path = %path.display(), records = store.len(), "snapshot saved");
    }
    Ok(())
}
