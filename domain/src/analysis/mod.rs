//! Agent analysis domain
//!
//! Result bundles produced by a single agent and the parsers that build
//! them from model output.

pub mod parsing;
pub mod result;

pub use parsing::{AnalysisSections, parse_analysis, parse_diagram, parse_diagram_edges, parse_steps};
pub use result::{AgentResult, DiagramEdge, DiagramSpec, ImplementationStep, StepRef};
