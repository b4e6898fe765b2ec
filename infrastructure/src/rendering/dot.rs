//! Graphviz DOT renderer.
//!
//! Writes each diagram as a DOT document under `<data_dir>/diagrams/` and
//! returns the file path as the image reference. The file name combines a
//! slug of the title with an FNV-1a hash of the document, so re-rendering
//! the same diagram reuses the same file across runs and toolchains.

use async_trait::async_trait;
use ideaforge_application::ports::diagram_renderer::{DiagramRenderer, RenderError};
use ideaforge_domain::{DiagramSpec, ImageReference};
use std::path::PathBuf;
use tracing::debug;

const SLUG_LIMIT: usize = 40;

pub struct DotDiagramRenderer {
    output_dir: PathBuf,
}

impl DotDiagramRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Renderer writing to `<data_dir>/diagrams`
    pub fn in_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(data_dir.into().join("diagrams"))
    }

    /// DOT source: top-to-bottom, rounded filled boxes
    pub fn to_dot(spec: &DiagramSpec) -> String {
        let mut dot = String::new();
        dot.push_str("// Implementation Plan\n");
        dot.push_str(&format!("digraph \"{}\" {{\n", escape(&spec.title)));
        dot.push_str("  rankdir=TB;\n");
        dot.push_str("  labelloc=t;\n");
        dot.push_str(&format!("  label=\"{}\";\n", escape(&spec.title)));
        dot.push_str("  node [shape=box, style=\"rounded,filled\", fillcolor=lightblue];\n");
        dot.push_str("  edge [color=\"#666666\"];\n");
        for edge in &spec.edges {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape(&edge.from),
                escape(&edge.to)
            ));
        }
        dot.push_str("}\n");
        dot
    }

    fn file_name(spec: &DiagramSpec, dot: &str) -> String {
        let slug = slug(&spec.title);
        let slug = if slug.is_empty() { "diagram" } else { &slug };
        format!("{}-{:08x}.dot", slug, fnv1a(dot.as_bytes()))
    }
}

/// 32-bit FNV-1a; fixed constants keep file names stable between builds
fn fnv1a(bytes: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, &b| (hash ^ u32::from(b)).wrapping_mul(PRIME))
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Lowercase ASCII alphanumerics joined by single dashes
fn slug(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
        if slug.len() >= SLUG_LIMIT {
            break;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[async_trait]
impl DiagramRenderer for DotDiagramRenderer {
    async fn render_diagram(&self, spec: &DiagramSpec) -> Result<ImageReference, RenderError> {
        if spec.edges.is_empty() {
            return Err(RenderError::EmptyDiagram);
        }

        let dot = Self::to_dot(spec);
        let path = self.output_dir.join(Self::file_name(spec, &dot));

        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, dot).await?;

        debug!(path = %path.display(), edges = spec.edges.len(), "Diagram written");
        Ok(ImageReference::new(path.display().to_string()))
    }
}
