//! Hex-MCTS: a Monte Carlo Tree Search engine for Hex.
//!
//! ## Usage
//!
//! - `hex-mcts selfplay` - Let two engines play a full game
//! - `hex-mcts analyze --moves "c3 swap e5"` - Search one position and report
//!
//! Logging is controlled by `RUST_LOG` or `--log-level`.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use hex_mcts::board::{Board, Color, should_swap};
use hex_mcts::cell::{Move, parse_moves};
use hex_mcts::config::SearchConfig;
use hex_mcts::constants::{DEFAULT_SIZE, EXPLORATION, MAX_SIZE};
use hex_mcts::mcts::{Decision, MctsAgent};
use hex_mcts::playout::Rollout;
use hex_mcts::policy::Policy;

/// Hex-MCTS: Monte Carlo Tree Search for the game of Hex
#[derive(Parser)]
#[command(name = "hex-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Default log filter when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Seed for reproducible searches
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a full game between two engines
    Selfplay {
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: usize,
        /// Thinking time per move in milliseconds
        #[arg(long, default_value_t = 1000)]
        time: u64,
        #[arg(long, default_value_t = Policy::Grave)]
        white: Policy,
        #[arg(long, default_value_t = Policy::Uct)]
        black: Policy,
        #[arg(long, default_value_t = Rollout::Uniform)]
        rollout: Rollout,
        /// Use the opening table for the swap decision instead of searching it
        #[arg(long)]
        swap_table: bool,
    },
    /// Search a position and print the most visited moves
    Analyze {
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: usize,
        /// Moves leading to the position, e.g. "f6 swap c3"
        #[arg(long, default_value = "")]
        moves: String,
        /// Search time in milliseconds
        #[arg(long, default_value_t = 2000)]
        time: u64,
        #[arg(long, default_value_t = Policy::Rave)]
        policy: Policy,
        #[arg(long, default_value_t = Rollout::Uniform)]
        rollout: Rollout,
        #[arg(long, default_value_t = EXPLORATION)]
        exploration: f64,
        /// Number of candidate moves to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Selfplay {
            size,
            time,
            white,
            black,
            rollout,
            swap_table,
        } => {
            let base = with_seed(SearchConfig::default().with_rollout(rollout), cli.seed);
            run_selfplay(
                size,
                Duration::from_millis(time),
                [base.clone().with_policy(white), base.with_policy(black)],
                swap_table,
            )
        }
        Commands::Analyze {
            size,
            moves,
            time,
            policy,
            rollout,
            exploration,
            top,
        } => {
            let config = SearchConfig::default()
                .with_policy(policy)
                .with_rollout(rollout)
                .with_exploration(exploration);
            run_analyze(
                size,
                &moves,
                Duration::from_millis(time),
                with_seed(config, cli.seed),
                top,
            )
        }
    }
}

fn with_seed(config: SearchConfig, seed: Option<u64>) -> SearchConfig {
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

fn check_size(size: usize) -> Result<()> {
    anyhow::ensure!(
        (1..=MAX_SIZE).contains(&size),
        "board size must be between 1 and {MAX_SIZE}, got {size}"
    );
    Ok(())
}

/// Play one game, each color driven by its own agent.
fn run_selfplay(
    size: usize,
    think: Duration,
    configs: [SearchConfig; 2],
    swap_table: bool,
) -> Result<()> {
    check_size(size)?;
    println!(
        "Hex-MCTS self-play on {size}x{size}: white={} black={}\n",
        configs[0].policy, configs[1].policy
    );

    let board = Board::new(size);
    let mut agents = configs.map(|config| MctsAgent::new(board.clone(), config));
    let mut history: Vec<Move> = Vec::new();

    loop {
        let state = agents[0].root_state();
        if let Some(winner) = state.winner() {
            println!("{state}");
            println!("{winner} wins after {} moves", history.len());
            info!(%winner, moves = history.len(), "game finished");
            return Ok(());
        }

        let color = state.to_play();
        let mv = match table_swap(state, &history, swap_table) {
            Some(mv) => mv,
            None => {
                let agent = &mut agents[color.index()];
                let stats = agent.search(think)?;
                info!(
                    %color,
                    rollouts = stats.num_rollouts,
                    nodes = stats.node_count,
                    "search complete"
                );
                match agent.best_move() {
                    Decision::Play(mv) => mv,
                    Decision::GameOver => anyhow::bail!("engine reported game over mid-game"),
                }
            }
        };

        println!("{color} plays {mv}");
        for agent in &mut agents {
            agent
                .play_move(mv)
                .with_context(|| format!("applying {mv}"))?;
        }
        history.push(mv);
    }
}

/// The opening-table answer to White's first stone, when enabled.
fn table_swap(state: &Board, history: &[Move], enabled: bool) -> Option<Move> {
    if !enabled || !state.can_swap() || state.to_play() != Color::Black {
        return None;
    }
    let opening = history.first()?.cell()?;
    should_swap(opening, state.size()).then_some(Move::Swap)
}

fn run_analyze(
    size: usize,
    moves: &str,
    think: Duration,
    config: SearchConfig,
    top: usize,
) -> Result<()> {
    check_size(size)?;
    let mut board = Board::new(size);
    for mv in parse_moves(moves).context("parsing --moves")? {
        board
            .play(mv)
            .with_context(|| format!("replaying {mv}"))?;
    }

    println!("{board}");
    println!("{} to play, policy {}\n", board.to_play(), config.policy);

    let mut agent = MctsAgent::new(board, config);
    let stats = agent.search(think)?;
    println!(
        "{} rollouts, {} nodes, {:.2}s",
        stats.num_rollouts,
        stats.node_count,
        stats.run_time.as_secs_f64()
    );

    for child in agent.root_children().into_iter().take(top) {
        println!(
            "  {:>5}  visits={:<7} value={:.3}",
            child.mv.to_string(),
            child.visits,
            child.value
        );
    }

    match agent.best_move() {
        Decision::Play(mv) => println!("\nBest move: {mv}"),
        Decision::GameOver => println!("\nGame over"),
    }
    Ok(())
}
