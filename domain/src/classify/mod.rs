//! Domain classifier
//!
//! Pure heuristics: keyword scoring over the idea text plus explicit user
//! overrides. The text-generation fallback for ambiguous input lives in the
//! application layer and reuses [`parse_domain_answer`].

pub mod classifier;
pub mod lexicon;

pub use classifier::{
    Classification, ClassifierConfig, DomainScores, classify, parse_domain_answer,
    resolve_supporting, unknown_domain_warning,
};
