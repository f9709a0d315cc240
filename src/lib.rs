//! Hex-MCTS: a Monte Carlo Tree Search engine for the game of Hex.
//!
//! The engine picks moves for Hex on an `n x n` rhombus under a wall-clock
//! budget. Winning chains are detected incrementally with a union-find per
//! color, the pie (swap) rule is part of the move set, and node valuation is
//! pluggable between UCT, RAVE and GRAVE.
//!
//! ## Modules
//!
//! - [`union_find`] - Disjoint sets with lazily registered elements
//! - [`cell`] - Coordinates, moves and their text encoding
//! - [`board`] - Board model, legality and winner detection
//! - [`bridges`] - Bridge tracking used by bridge-aware simulations
//! - [`tree`] - Arena-allocated search tree
//! - [`policy`] - UCT / RAVE / GRAVE valuation and backup
//! - [`playout`] - Random game simulation
//! - [`mcts`] - The time-budgeted search engine
//! - [`config`] - Search parameters
//! - [`constants`] - Board geometry and default parameters
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//!
//! use hex_mcts::board::Board;
//! use hex_mcts::config::SearchConfig;
//! use hex_mcts::mcts::{Decision, MctsAgent};
//!
//! let mut board = Board::new(5);
//! board.play("c3".parse().unwrap()).unwrap();
//!
//! let mut agent = MctsAgent::new(board, SearchConfig::rave().with_seed(7));
//! agent.search(Duration::from_millis(20)).unwrap();
//! if let Decision::Play(mv) = agent.best_move() {
//!     println!("Best reply: {mv}");
//!     agent.play_move(mv).unwrap();
//! }
//! ```

pub mod board;
pub mod bridges;
pub mod cell;
pub mod config;
pub mod constants;
pub mod error;
pub mod mcts;
pub mod playout;
pub mod policy;
pub mod tree;
pub mod union_find;
