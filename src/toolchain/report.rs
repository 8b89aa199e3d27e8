use serde::Serialize;

use super::command::Action;
use super::runner::Classification;

pub const SIMULATION_MESSAGE: &str = "Arduino CLI not found. Mode: Simulation.";

/// Terminal result of one orchestration call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    /// Raw toolchain stderr, passed through untouched
    Failure(String),
    SimulatedFallback(String),
}

/// Success-shaped response body
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}

pub fn report(action: Action, classification: Classification) -> Outcome {
    match classification {
        Classification::Succeeded(_) => Outcome::Success(success_message(action).to_string()),
        Classification::BuildOrUploadFailed { diagnostic } => Outcome::Failure(diagnostic),
        Classification::ToolchainAbsent => {
            Outcome::SimulatedFallback(SIMULATION_MESSAGE.to_string())
        }
    }
}

fn success_message(action: Action) -> &'static str {
    match action {
        Action::Compile => "Sketch compiled successfully!",
        Action::CompileAndUpload => "Sketch uploaded successfully!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::runner::ToolchainResult;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_success() {
        let classification = Classification::Succeeded(ToolchainResult {
            exit_code: 0,
            stdout: "Sketch uses 924 bytes".to_string(),
            stderr: String::new(),
        });
        assert_eq!(
            report(Action::Compile, classification.clone()),
            Outcome::Success("Sketch compiled successfully!".to_string())
        );
        assert_eq!(
            report(Action::CompileAndUpload, classification),
            Outcome::Success("Sketch uploaded successfully!".to_string())
        );
    }

    #[test]
    fn test_report_failure_is_verbatim() {
        let diagnostic = "AireduinoSketch.ino:4:3: error: 'foo' was not declared\n  foo();\n  ^~~\n";
        assert_eq!(
            report(
                Action::CompileAndUpload,
                Classification::BuildOrUploadFailed {
                    diagnostic: diagnostic.to_string()
                }
            ),
            Outcome::Failure(diagnostic.to_string())
        );
    }

    #[test]
    fn test_report_absent_is_simulated() {
        assert_eq!(
            report(Action::Compile, Classification::ToolchainAbsent),
            Outcome::SimulatedFallback(SIMULATION_MESSAGE.to_string())
        );
    }
}
