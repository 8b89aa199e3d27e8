use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::workspace::Workspace;
use crate::error::DeployError;

/// What the toolchain is asked to do with a staged sketch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Compile,
    /// Always compiles first: a fresh workspace has no build artifacts to upload
    CompileAndUpload,
}

impl Action {
    pub fn requires_port(self) -> bool {
        matches!(self, Self::CompileAndUpload)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile => write!(f, "compile"),
            Self::CompileAndUpload => write!(f, "upload"),
        }
    }
}

/// A fully resolved toolchain command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainInvocation {
    pub executable_path: PathBuf,
    /// Arguments after the executable
    pub arguments: Vec<String>,
}

impl ToolchainInvocation {
    /// The complete argument vector, executable first
    pub fn argument_vector(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.arguments.len() + 1);
        argv.push(self.executable_path.to_string_lossy().into_owned());
        argv.extend(self.arguments.iter().cloned());
        argv
    }
}

/// Returns the trimmed port when present and non-blank
pub fn non_blank(port: Option<&str>) -> Option<&str> {
    port.map(str::trim).filter(|p| !p.is_empty())
}

/// Builds the compile or compile-and-upload command for a staged workspace
pub fn build(
    action: Action,
    executable_path: &Path,
    board: &str,
    workspace: &Workspace,
    port: Option<&str>,
) -> Result<ToolchainInvocation, DeployError> {
    let source = workspace.source_file_path().to_string_lossy().into_owned();

    let arguments = match action {
        Action::Compile => vec![
            "compile".to_string(),
            "--fqbn".to_string(),
            board.to_string(),
            source,
        ],
        Action::CompileAndUpload => {
            let port = non_blank(port)
                .ok_or_else(|| DeployError::Validation("Port required for upload".to_string()))?;
            vec![
                "compile".to_string(),
                "--upload".to_string(),
                "-p".to_string(),
                port.to_string(),
                "--fqbn".to_string(),
                board.to_string(),
                source,
            ]
        }
    };

    Ok(ToolchainInvocation {
        executable_path: executable_path.to_path_buf(),
        arguments,
    })
}

/// Builds the command that reports attached boards as JSON
pub fn board_list(executable_path: &Path) -> ToolchainInvocation {
    ToolchainInvocation {
        executable_path: executable_path.to_path_buf(),
        arguments: ["board", "list", "--format", "json"]
            .into_iter()
            .map(String::from)
            .collect(),
    }
}
