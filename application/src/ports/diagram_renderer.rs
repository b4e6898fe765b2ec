//! Diagram rendering port
//!
//! Rendering is best effort: a failure leaves the consensus result with the
//! diagram description only.

use async_trait::async_trait;
use ideaforge_domain::{DiagramSpec, ImageReference};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Diagram has no edges")]
    EmptyDiagram,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    async fn render_diagram(&self, spec: &DiagramSpec) -> Result<ImageReference, RenderError>;
}
