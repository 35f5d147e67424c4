//! Share sheet backed by an external command

use async_trait::async_trait;
use lightbox_transfer::{HostError, HostResult, ShareSheet};
use std::path::Path;
use std::process::Stdio;

/// Launches `program args... <path>` and returns once it has started.
#[derive(Debug, Clone)]
pub struct CommandShareSheet {
    program: String,
    args: Vec<String>,
}

impl CommandShareSheet {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args...]` list
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// The platform's "open with" handler
    pub fn system_default() -> Self {
        #[cfg(target_os = "windows")]
        {
            Self::new("explorer", Vec::new())
        }
        #[cfg(target_os = "macos")]
        {
            Self::new("open", Vec::new())
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            Self::new("xdg-open", Vec::new())
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl ShareSheet for CommandShareSheet {
    async fn share(&self, path: &Path) -> HostResult<()> {
        let child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HostError::new(format!("Failed to launch {}: {}", self.program, e)))?;

        // Not awaited: the sheet lives on after the hand-off
        tracing::info!(
            program = %self.program,
            pid = ?child.id(),
            path = %path.display(),
            "Opened share sheet"
        );
        Ok(())
    }
}
