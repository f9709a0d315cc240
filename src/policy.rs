//! Node valuation and backup policies.
//!
//! All policies share one selection rule: the child with the highest value
//! wins, ties are broken uniformly at random, and an unvisited child is
//! returned as soon as it is selected. They differ in how a node is valued
//! and in what backup records:
//!
//! - UCT scores `Q/N + c * sqrt(2 ln N_parent / N)` with rewards in `{0, 1}`.
//! - RAVE blends UCT with the node's all-moves-as-first (AMAF) mean,
//!   weighted by `alpha = max(0, (K - N) / K)`, with rewards in `{-1, +1}`.
//! - GRAVE uses the same blend, but a node with fewer than `grave_ref` AMAF
//!   samples borrows the AMAF counters of its nearest ancestor that has
//!   enough.

use std::fmt;
use std::str::FromStr;

use crate::board::Color;
use crate::cell::Move;
use crate::config::SearchConfig;
use crate::error::HexError;
use crate::playout::Playout;
use crate::tree::{NodeId, Tree};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    #[default]
    Uct,
    Rave,
    Grave,
}

impl Policy {
    /// Whether backup maintains the AMAF counters.
    #[inline]
    pub fn uses_amaf(self) -> bool {
        !matches!(self, Policy::Uct)
    }

    /// Selection score of node `id`.
    pub fn value(self, tree: &Tree, id: NodeId, config: &SearchConfig) -> f64 {
        let node = tree.get(id);
        if node.n == 0 {
            return if config.exploration > 0.0 {
                f64::INFINITY
            } else {
                0.0
            };
        }
        let uct = uct_value(tree, id, config.exploration);
        let (n_rave, q_rave) = match self {
            Policy::Uct => return uct,
            Policy::Rave => (node.n_rave, node.q_rave),
            Policy::Grave => grave_amaf_source(tree, id, config.grave_ref),
        };

        let amaf = if n_rave > 0 {
            q_rave / n_rave as f64
        } else {
            0.0
        };
        let alpha = rave_weight(node.n, config.rave_const);
        (1.0 - alpha) * uct + alpha * amaf
    }

    /// Pick the child of `id` to descend into, or `None` for a leaf.
    pub fn select_child(
        self,
        tree: &Tree,
        id: NodeId,
        config: &SearchConfig,
        rng: &mut fastrand::Rng,
    ) -> Option<NodeId> {
        let scored: Vec<(NodeId, f64)> = tree
            .children(id)
            .map(|(_, child)| (child, self.value(tree, child, config)))
            .collect();

        let best = scored
            .iter()
            .map(|&(_, v)| v)
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<NodeId> = scored
            .into_iter()
            .filter(|&(_, v)| v == best)
            .map(|(child, _)| child)
            .collect();

        if ties.is_empty() {
            None
        } else {
            Some(ties[rng.usize(..ties.len())])
        }
    }

    /// Reward credited to the node reached by the simulation, whose side to
    /// move is `to_play`. It is stored from the point of view of the player
    /// who moved into that node.
    fn leaf_reward(self, winner: Color, to_play: Color) -> f64 {
        let lost = winner == to_play;
        match (self, lost) {
            (Policy::Uct, true) => 0.0,
            (Policy::Uct, false) => 1.0,
            (_, true) => -1.0,
            (_, false) => 1.0,
        }
    }

    /// Reward for the parent, given the reward of its child.
    #[inline]
    fn flip(self, reward: f64) -> f64 {
        match self {
            Policy::Uct => 1.0 - reward,
            Policy::Rave | Policy::Grave => -reward,
        }
    }

    /// Propagate a finished simulation from `leaf` up to the root.
    ///
    /// `to_play` is the side to move in the position of `leaf`.
    pub fn backup(self, tree: &mut Tree, leaf: NodeId, to_play: Color, playout: &Playout) {
        let mut reward = self.leaf_reward(playout.winner, to_play);
        let mut player = to_play;
        let mut current = Some(leaf);

        while let Some(id) = current {
            if self.uses_amaf() {
                for &cell in playout.stones_of(player) {
                    if let Some(child) = tree.child(id, Move::Cell(cell)) {
                        let child = tree.get_mut(child);
                        child.n_rave += 1;
                        child.q_rave -= reward;
                    }
                }
            }

            let node = tree.get_mut(id);
            node.n += 1;
            node.q += reward;

            reward = self.flip(reward);
            player = player.opponent();
            current = node.parent;
        }
    }
}

fn uct_value(tree: &Tree, id: NodeId, exploration: f64) -> f64 {
    let node = tree.get(id);
    let n = node.n as f64;
    let parent_n = tree.parent(id).map_or(n, |p| tree.get(p).n as f64);
    node.q / n + exploration * (2.0 * parent_n.ln() / n).sqrt()
}

/// Weight of the AMAF estimate after `n` real visits.
fn rave_weight(n: u32, rave_const: f64) -> f64 {
    if rave_const <= 0.0 {
        return 0.0;
    }
    ((rave_const - n as f64) / rave_const).max(0.0)
}

/// AMAF counters GRAVE uses for `id`.
///
/// A node with at least `grave_ref` samples of its own uses them. Otherwise
/// the nearest ancestor whose own counters reach `grave_ref` lends its
/// statistics, and the node falls back to its own when none does.
fn grave_amaf_source(tree: &Tree, id: NodeId, grave_ref: u32) -> (u32, f64) {
    let node = tree.get(id);
    if node.n_rave >= grave_ref {
        return (node.n_rave, node.q_rave);
    }

    let mut ancestor = node.parent;
    while let Some(a) = ancestor {
        let donor = tree.get(a);
        if donor.n_rave >= grave_ref {
            return (donor.n_rave, donor.q_rave);
        }
        ancestor = donor.parent;
    }
    (node.n_rave, node.q_rave)
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Uct => f.write_str("uct"),
            Policy::Rave => f.write_str("rave"),
            Policy::Grave => f.write_str("grave"),
        }
    }
}

impl FromStr for Policy {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uct" => Ok(Policy::Uct),
            "rave" => Ok(Policy::Rave),
            "grave" => Ok(Policy::Grave),
            _ => Err(HexError::Parse(s.to_string())),
        }
    }
}
