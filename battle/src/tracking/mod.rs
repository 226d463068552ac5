//! Battle state tracking from structured events

mod battle;
mod matching;
mod reconcile;
mod updater;

pub use battle::{CurrentAction, TrackedBattle};
pub use matching::{DEFAULT_DISGUISE, find_entry, request_position};
