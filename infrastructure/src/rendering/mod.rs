//! Diagram rendering adapters

mod dot;

pub use dot::DotDiagramRenderer;
