//! Search configuration.

use crate::constants::{EXPLORATION, GRAVE_REF, RAVE_CONST};
use crate::playout::Rollout;
use crate::policy::Policy;

/// Parameters fixed for the lifetime of an [`MctsAgent`](crate::mcts::MctsAgent).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Node valuation and backup rule.
    pub policy: Policy,

    /// How simulations pick moves.
    pub rollout: Rollout,

    /// UCT exploration weight. With 0, unvisited children score 0 instead of
    /// infinity and the search becomes greedy.
    pub exploration: f64,

    /// RAVE equivalence constant `K`: AMAF weight is `max(0, (K - N) / K)`.
    pub rave_const: f64,

    /// GRAVE threshold: AMAF samples needed before a node's statistics are used.
    pub grave_ref: u32,

    /// Seed for the engine's random generator; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            policy: Policy::Uct,
            rollout: Rollout::Uniform,
            exploration: EXPLORATION,
            rave_const: RAVE_CONST,
            grave_ref: GRAVE_REF,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn uct() -> Self {
        Self::default()
    }

    pub fn rave() -> Self {
        Self::default().with_policy(Policy::Rave)
    }

    /// GRAVE valuation with bridge-aware simulations.
    pub fn grave() -> Self {
        Self::default()
            .with_policy(Policy::Grave)
            .with_rollout(Rollout::Bridges)
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_rollout(mut self, rollout: Rollout) -> Self {
        self.rollout = rollout;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_rave_const(mut self, k: f64) -> Self {
        self.rave_const = k;
        self
    }

    pub fn with_grave_ref(mut self, r: u32) -> Self {
        self.grave_ref = r;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
