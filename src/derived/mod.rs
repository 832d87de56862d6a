//! Pure view logic computed from cached resources.
//!
//! Nothing here touches the [`Store`](crate::state::Store) or the network; views call
//! these on a snapshot and re-run them whenever a `DataChanged` event arrives.

pub mod filter;
pub mod recommend;
pub mod stats;

pub use filter::JobFilter;
pub use recommend::{MatchScore, Recommendation, match_score, recommend_jobs};
pub use stats::{ApplicationStats, RecruiterDashboard};
