use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use madori_ipc::ClientInfo;

use crate::core::Window;

/// Trait for obtaining the live window list.
/// This abstraction allows mocking in tests.
pub trait WindowSource {
    fn windows(&self) -> Result<Vec<Window>>;
}

/// Queries a running Hyprland instance through `hyprctl clients -j`.
pub struct HyprctlSource {
    program: String,
}

impl Default for HyprctlSource {
    fn default() -> Self {
        Self {
            program: "hyprctl".to_string(),
        }
    }
}

impl WindowSource for HyprctlSource {
    fn windows(&self) -> Result<Vec<Window>> {
        tracing::debug!("Querying clients via {}", self.program);
        let output = Command::new(&self.program)
            .args(["clients", "-j"])
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let json = String::from_utf8(output.stdout).context("hyprctl output is not UTF-8")?;
        decode_clients(&json)
    }
}

/// Reads a saved `hyprctl clients -j` dump.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WindowSource for JsonFileSource {
    fn windows(&self) -> Result<Vec<Window>> {
        tracing::debug!("Reading clients from {:?}", self.path);
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        decode_clients(&json)
            .with_context(|| format!("Invalid client list in {}", self.path.display()))
    }
}

fn decode_clients(json: &str) -> Result<Vec<Window>> {
    let clients = ClientInfo::parse_list(json).context("Failed to decode client list")?;
    Ok(clients.into_iter().map(Window::from).collect())
}

#[cfg(test)]
pub mod mock {
    use super::*;

    #[derive(Default)]
    pub struct MockWindowSource {
        pub windows: Vec<Window>,
    }

    impl MockWindowSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_windows(mut self, windows: Vec<Window>) -> Self {
            self.windows = windows;
            self
        }
    }

    impl WindowSource for MockWindowSource {
        fn windows(&self) -> Result<Vec<Window>> {
            Ok(self.windows.clone())
        }
    }
}
