use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub const PDF_MIME: &str = "application/pdf";

/// Rendering seam between the relay loop and the terminal, so the loop can
/// be driven by a recording renderer in tests.
pub trait Renderer {
    fn render_user(&mut self, text: &str);

    /// Renders the full accumulated response buffer, replacing anything
    /// previously shown for this turn.
    fn render_assistant(&mut self, buffer: &str);
}

/// Chat-style terminal renderer. Assistant output is re-rendered in place
/// using ANSI cursor movement: the previously printed block is cleared and
/// the full buffer reprinted on each streamed state.
#[derive(Default)]
pub struct TerminalRenderer {
    rendered_lines: usize,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_download(&self, artifact: &DownloadArtifact) {
        println!();
        println!("\x1b[32m--- Research paper generated ---\x1b[0m");
        println!(
            "  {} ({}) — type :save to copy it here",
            artifact.file_name, artifact.mime
        );
    }
}

impl Renderer for TerminalRenderer {
    fn render_user(&mut self, _text: &str) {
        // The typed line is already on screen after the prompt; just start
        // a fresh assistant block.
        self.rendered_lines = 0;
    }

    fn render_assistant(&mut self, buffer: &str) {
        let mut out = io::stdout();
        if self.rendered_lines > 0 {
            // Move back over the previous render and wipe it.
            let _ = write!(out, "\x1b[{}A\x1b[J", self.rendered_lines);
        }
        let block = format!("\x1b[36magent>\x1b[0m {}", buffer.trim_end());
        let _ = writeln!(out, "{}", block);
        let _ = out.flush();
        self.rendered_lines = block.lines().count();
    }
}

/// Download control shown after a turn when the session's stored PDF path
/// resolves to an existing file. A stale path whose file is gone simply
/// yields no artifact; the control is omitted without comment.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: &'static str,
}

impl DownloadArtifact {
    pub fn from_path(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            path: path.to_path_buf(),
            file_name,
            mime: PDF_MIME,
        })
    }

    /// Copies the artifact into `dir` under its base name.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(&self.file_name);
        std::fs::copy(&self.path, &target)
            .with_context(|| format!("failed to copy {} to {}", self.path.display(), target.display()))?;
        info!("Saved {} to {}", self.file_name, target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_no_artifact() {
        let path = Path::new("C:\\definitely\\not\\here.pdf");
        assert!(DownloadArtifact::from_path(path).is_none());
    }

    #[test]
    fn existing_file_yields_artifact_with_base_name() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("relay-render-test-{}.pdf", std::process::id()));
        std::fs::write(&path, b"%PDF-1.4 stub").expect("write temp pdf");

        let artifact = DownloadArtifact::from_path(&path).expect("artifact expected");
        assert_eq!(artifact.mime, "application/pdf");
        assert_eq!(
            artifact.file_name,
            path.file_name().unwrap().to_string_lossy()
        );

        let _ = std::fs::remove_file(&path);
    }
}
