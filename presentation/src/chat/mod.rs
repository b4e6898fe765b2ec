//! Interactive dialogue module
//!
//! Provides a readline-based interface that refines one idea across turns.

mod repl;

pub use repl::{ChatRepl, ReplCommand};
