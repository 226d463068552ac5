//! Query helpers for battle decision making
//!
//! Type-level questions asked both by disguise inference in the tracker and
//! by move scoring in the agent.

mod matchup;

pub use matchup::{
    best_effectiveness, blocks_powder, blocks_status, is_immune_to, matchup_score, weaknesses,
};
