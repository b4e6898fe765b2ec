//! Consensus domain
//!
//! Merges the independent results of several domain agents into one ranked,
//! de-duplicated response.
//!
//! ```text
//! AgentResult (code) ─────┐
//! AgentResult (business) ─┼─▶ merge ─▶ ConsensusResult
//! AgentResult (science) ──┘     │
//!                               ├─ suggestions / questions / concepts: grouped by similarity key, ranked by votes
//!                               ├─ steps: topologically interleaved
//!                               └─ diagram: single selection by precedence
//! ```

pub mod merge;
pub mod plan;
pub mod result;

pub use merge::merge;
pub use plan::interleave_steps;
pub use result::{
    ConsensusResult, ExcludedDomain, ExclusionReason, ImageReference, MergedItem, MergedStep,
    SelectedDiagram,
};
