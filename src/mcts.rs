//! Monte Carlo Tree Search engine.
//!
//! Each iteration runs four phases on a private copy of the root position:
//!
//! 1. **Select**: descend with the configured [`Policy`] until an unvisited
//!    child or an unexpanded leaf is reached, replaying every move.
//! 2. **Expand**: unless the position is already won, attach one child per
//!    legal move and continue into one of them at random.
//! 3. **Simulate**: finish the game with the configured [`Rollout`].
//! 4. **Backup**: hand the outcome to the policy, which updates the path.
//!
//! The tree survives between moves: [`MctsAgent::play_move`] re-roots it at
//! the chosen child so earlier work on that line is kept.
//!
//! [`Policy`]: crate::policy::Policy
//! [`Rollout`]: crate::playout::Rollout

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::board::Board;
use crate::cell::Move;
use crate::config::SearchConfig;
use crate::error::HexError;
use crate::tree::{NodeId, Tree};

/// Counters from the most recent search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    /// Simulations completed.
    pub num_rollouts: usize,
    /// Nodes reachable from the root after the search.
    pub node_count: usize,
    pub run_time: Duration,
}

/// Result of [`MctsAgent::best_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Play(Move),
    /// The root position already has a winner.
    GameOver,
}

/// Statistics of one root child, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary {
    pub mv: Move,
    pub visits: u32,
    /// Mean reward for the player making `mv`.
    pub value: f64,
}

pub struct MctsAgent {
    config: SearchConfig,
    root_state: Board,
    tree: Tree,
    rng: fastrand::Rng,
    stats: SearchStats,
}

impl MctsAgent {
    pub fn new(board: Board, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            config,
            root_state: board,
            tree: Tree::new(),
            rng,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn root_state(&self) -> &Board {
        &self.root_state
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Run iterations until `time_budget` has elapsed.
    ///
    /// The clock is checked between iterations only, so the last iteration
    /// always completes and the search may overrun the budget slightly.
    pub fn search(&mut self, time_budget: Duration) -> Result<SearchStats, HexError> {
        let start = Instant::now();
        let mut rollouts = 0;
        while start.elapsed() < time_budget {
            self.run_iteration()?;
            rollouts += 1;
        }
        Ok(self.record(rollouts, start.elapsed()))
    }

    /// Run exactly `count` iterations.
    pub fn search_rollouts(&mut self, count: usize) -> Result<SearchStats, HexError> {
        let start = Instant::now();
        for _ in 0..count {
            self.run_iteration()?;
        }
        Ok(self.record(count, start.elapsed()))
    }

    fn record(&mut self, num_rollouts: usize, run_time: Duration) -> SearchStats {
        self.stats = SearchStats {
            num_rollouts,
            node_count: self.tree.size(),
            run_time,
        };
        debug!(
            policy = %self.config.policy,
            rollouts = num_rollouts,
            nodes = self.stats.node_count,
            elapsed_ms = run_time.as_millis() as u64,
            "search finished"
        );
        self.stats
    }

    fn run_iteration(&mut self) -> Result<(), HexError> {
        let (leaf, state) = self.select_node()?;
        let to_play = state.to_play();
        let playout = self.config.rollout.run(state, &mut self.rng)?;
        self.config
            .policy
            .backup(&mut self.tree, leaf, to_play, &playout);

        trace!(winner = %playout.winner, "simulation complete");
        Ok(())
    }

    /// Descend to the node to simulate from, expanding it if needed.
    ///
    /// Returns the node together with its position.
    fn select_node(&mut self) -> Result<(NodeId, Board), HexError> {
        let mut id = self.tree.root();
        let mut state = self.root_state.clone();

        while let Some(child) =
            self.config
                .policy
                .select_child(&self.tree, id, &self.config, &mut self.rng)
        {
            id = child;
            self.replay(id, &mut state)?;
            if self.tree.get(id).n == 0 {
                return Ok((id, state));
            }
        }

        if self.expand(id, &state) {
            let children: Vec<NodeId> = self.tree.children(id).map(|(_, c)| c).collect();
            id = children[self.rng.usize(..children.len())];
            self.replay(id, &mut state)?;
        }
        Ok((id, state))
    }

    fn replay(&self, id: NodeId, state: &mut Board) -> Result<(), HexError> {
        match self.tree.get(id).mv {
            Some(mv) => state.play(mv),
            None => Ok(()),
        }
    }

    /// Attach a child per legal move of `state` under `id`.
    ///
    /// Returns `false` for a finished game, which is never expanded.
    fn expand(&mut self, id: NodeId, state: &Board) -> bool {
        if state.winner().is_some() {
            return false;
        }
        let moves = state.legal_moves();
        if moves.is_empty() {
            return false;
        }
        self.tree.add_children(id, moves);
        true
    }

    /// The root move with the most visits, ties broken at random.
    ///
    /// An unexpanded root is expanded first, so an unsearched agent still
    /// answers with a random legal move.
    pub fn best_move(&mut self) -> Decision {
        if self.root_state.winner().is_some() {
            return Decision::GameOver;
        }
        let root = self.tree.root();
        if self.tree.get(root).is_leaf() {
            let state = self.root_state.clone();
            self.expand(root, &state);
        }

        let Some(max_visits) = self
            .tree
            .children(root)
            .map(|(_, c)| self.tree.get(c).n)
            .max()
        else {
            return Decision::GameOver;
        };
        let best: Vec<Move> = self
            .tree
            .children(root)
            .filter(|&(_, c)| self.tree.get(c).n == max_visits)
            .map(|(mv, _)| mv)
            .collect();
        Decision::Play(best[self.rng.usize(..best.len())])
    }

    /// Advance the real game by `mv`.
    ///
    /// The subtree under `mv` becomes the new tree when it exists; otherwise the
    /// tree restarts from the new position.
    pub fn play_move(&mut self, mv: Move) -> Result<(), HexError> {
        self.root_state.play(mv)?;
        if self.tree.reroot(mv) {
            debug!(%mv, nodes = self.tree.len(), "re-rooted search tree");
        } else {
            debug!(%mv, "move not in tree, starting a fresh tree");
            self.tree = Tree::new();
        }
        Ok(())
    }

    /// Replace the root position and drop the tree.
    pub fn set_gamestate(&mut self, board: Board) {
        self.root_state = board;
        self.tree = Tree::new();
    }

    /// Counters from the most recent search.
    #[inline]
    pub fn statistics(&self) -> SearchStats {
        self.stats
    }

    /// Nodes reachable from the current root.
    pub fn tree_size(&self) -> usize {
        self.tree.size()
    }

    /// Root children ordered by visits, most visited first.
    pub fn root_children(&self) -> Vec<ChildSummary> {
        let mut summary: Vec<ChildSummary> = self
            .tree
            .children(self.tree.root())
            .map(|(mv, id)| {
                let node = self.tree.get(id);
                ChildSummary {
                    mv,
                    visits: node.n,
                    value: node.mean(),
                }
            })
            .collect();
        summary.sort_by(|a, b| b.visits.cmp(&a.visits).then(a.mv.cmp(&b.mv)));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;
    use crate::cell::Cell;
    use crate::playout::Rollout;
    use crate::policy::Policy;

    fn board(size: usize, moves: &[&str]) -> Board {
        let mut board = Board::new(size);
        for mv in moves {
            board.play(mv.parse().unwrap()).unwrap();
        }
        board
    }

    #[test]
    fn test_search_rollouts_counts() {
        let mut agent = MctsAgent::new(Board::new(4), SearchConfig::default().with_seed(1));
        let stats = agent.search_rollouts(200).unwrap();
        assert_eq!(stats.num_rollouts, 200);
        assert_eq!(agent.tree.get(agent.tree.root()).n, 200);
        assert_eq!(stats.node_count, agent.tree_size());
        assert_eq!(agent.statistics(), stats);
    }

    #[test]
    fn test_root_children_cover_legal_moves() {
        let mut agent = MctsAgent::new(board(3, &["b2"]), SearchConfig::default().with_seed(2));
        agent.search_rollouts(50).unwrap();
        let children = agent.root_children();
        // Eight empty cells plus the swap.
        assert_eq!(children.len(), 9);
        assert!(children.iter().any(|c| c.mv == Move::Swap));
        assert!(children.windows(2).all(|w| w[0].visits >= w[1].visits));
        let visits: u32 = children.iter().map(|c| c.visits).sum();
        assert_eq!(visits, 50);
    }

    #[test]
    fn test_best_move_game_over() {
        let mut agent = MctsAgent::new(
            board(3, &["a1", "c1", "a2", "c2", "a3"]),
            SearchConfig::default(),
        );
        assert_eq!(agent.root_state().winner(), Some(Color::White));
        assert_eq!(agent.best_move(), Decision::GameOver);
    }

    #[test]
    fn test_best_move_without_search_is_legal() {
        let mut agent = MctsAgent::new(Board::new(3), SearchConfig::default().with_seed(3));
        match agent.best_move() {
            Decision::Play(Move::Cell(cell)) => assert!(agent.root_state().contains(cell)),
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn test_finds_immediate_win() {
        // White to play; a3 joins a1-a2 to the bottom edge.
        let position = board(3, &["a1", "c1", "a2", "c2"]);
        for policy in [Policy::Uct, Policy::Rave, Policy::Grave] {
            let config = SearchConfig::default()
                .with_policy(policy)
                .with_seed(4);
            let mut agent = MctsAgent::new(position.clone(), config);
            agent.search_rollouts(300).unwrap();
            assert_eq!(
                agent.best_move(),
                Decision::Play(Move::Cell(Cell::new(2, 0))),
                "{policy} missed the win"
            );
        }
    }

    #[test]
    fn test_play_move_reroots() {
        let mut agent = MctsAgent::new(Board::new(3), SearchConfig::default().with_seed(5));
        agent.search_rollouts(300).unwrap();
        let Decision::Play(mv) = agent.best_move() else {
            panic!("expected a move");
        };
        let child = agent.tree.child(agent.tree.root(), mv).unwrap();
        let (n, q) = (agent.tree.get(child).n, agent.tree.get(child).q);
        let subtree = {
            let mut count = 0;
            let mut stack = vec![child];
            while let Some(id) = stack.pop() {
                count += 1;
                stack.extend(agent.tree.get(id).children.values().copied());
            }
            count
        };

        agent.play_move(mv).unwrap();
        let root = agent.tree.get(agent.tree.root());
        assert_eq!(root.n, n);
        assert_eq!(root.q, q);
        assert_eq!(agent.tree_size(), subtree);
        assert_eq!(agent.tree.len(), subtree);
        assert_eq!(agent.root_state().num_played(), 1);
    }

    #[test]
    fn test_play_unexplored_move_resets_tree() {
        let mut agent = MctsAgent::new(Board::new(3), SearchConfig::default().with_seed(6));
        agent.play_move("b2".parse().unwrap()).unwrap();
        assert_eq!(agent.tree_size(), 1);
        assert!(agent.play_move("b2".parse().unwrap()).is_err());
        assert_eq!(agent.root_state().num_played(), 1);
    }

    #[test]
    fn test_set_gamestate_drops_tree() {
        let mut agent = MctsAgent::new(Board::new(3), SearchConfig::default().with_seed(7));
        agent.search_rollouts(20).unwrap();
        assert!(agent.tree_size() > 1);
        agent.set_gamestate(board(3, &["a1"]));
        assert_eq!(agent.tree_size(), 1);
        assert_eq!(agent.root_state().to_play(), Color::Black);
    }

    #[test]
    fn test_time_budget_search() {
        let config = SearchConfig::grave()
            .with_rollout(Rollout::Bridges)
            .with_seed(8);
        let mut agent = MctsAgent::new(Board::new(5), config);
        let stats = agent.search(Duration::from_millis(50)).unwrap();
        assert!(stats.num_rollouts > 0);
        assert!(stats.run_time >= Duration::from_millis(50));
    }
}
