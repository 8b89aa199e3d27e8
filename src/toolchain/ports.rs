use serde::{Deserialize, Serialize};

use super::Orchestrator;
use super::command;
use super::runner::RunOutcome;

/// One selectable device port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub device: String,
    pub description: String,
}

impl PortInfo {
    /// Substituted when nothing is detected so the UI always has a choice
    pub fn simulated() -> Self {
        Self {
            device: "MOCK_COM3".to_string(),
            description: "Arduino Uno (Simulated)".to_string(),
        }
    }
}

/// `board list --format json` output; older toolchains emit a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum BoardListReport {
    Legacy(Vec<DetectedPort>),
    Current {
        #[serde(default)]
        detected_ports: Vec<DetectedPort>,
    },
}

#[derive(Deserialize)]
struct DetectedPort {
    port: PortDetails,
    #[serde(default)]
    matching_boards: Vec<MatchingBoard>,
}

#[derive(Deserialize)]
struct PortDetails {
    address: String,
    #[serde(default)]
    protocol_label: Option<String>,
}

#[derive(Deserialize)]
struct MatchingBoard {
    name: String,
}

impl From<DetectedPort> for PortInfo {
    fn from(detected: DetectedPort) -> Self {
        let description = detected
            .matching_boards
            .into_iter()
            .map(|b| b.name)
            .find(|name| !name.is_empty())
            .or(detected.port.protocol_label)
            .unwrap_or_else(|| "Unknown device".to_string());

        Self {
            device: detected.port.address,
            description,
        }
    }
}

/// Parses the toolchain's board report into port entries
pub fn parse_board_list(json: &str) -> serde_json::Result<Vec<PortInfo>> {
    let detected = match serde_json::from_str::<BoardListReport>(json)? {
        BoardListReport::Legacy(ports) => ports,
        BoardListReport::Current { detected_ports } => detected_ports,
    };
    Ok(detected.into_iter().map(PortInfo::from).collect())
}

impl Orchestrator {
    /// Lists attached device ports, never returning an empty list
    pub async fn list_ports(&self) -> Vec<PortInfo> {
        let mut ports = self.detect_ports().await;
        if ports.is_empty() {
            ports.push(PortInfo::simulated());
        }
        ports
    }

    async fn detect_ports(&self) -> Vec<PortInfo> {
        let invocation = command::board_list(&self.locator.locate());

        match self.runner.run(&invocation).await {
            Ok(RunOutcome::Completed(result)) if result.exit_code == 0 => {
                parse_board_list(&result.stdout).unwrap_or_else(|e| {
                    log::warn!("Unparsable board list from toolchain: {e}");
                    Vec::new()
                })
            }
            Ok(RunOutcome::Completed(result)) => {
                log::warn!(
                    "Board listing exited with code {}: {}",
                    result.exit_code,
                    result.stderr.trim_end()
                );
                Vec::new()
            }
            Ok(RunOutcome::ToolchainAbsent) => Vec::new(),
            Err(e) => {
                log::warn!("Board listing failed: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_current_report() {
        let json = r#"{
            "detected_ports": [
                {
                    "matching_boards": [{"name": "Arduino Uno", "fqbn": "arduino:avr:uno"}],
                    "port": {
                        "address": "/dev/ttyACM0",
                        "label": "/dev/ttyACM0",
                        "protocol": "serial",
                        "protocol_label": "Serial Port (USB)"
                    }
                },
                {
                    "port": {
                        "address": "/dev/ttyS0",
                        "protocol": "serial",
                        "protocol_label": "Serial Port"
                    }
                }
            ]
        }"#;

        assert_eq!(
            parse_board_list(json).unwrap(),
            vec![
                PortInfo {
                    device: "/dev/ttyACM0".to_string(),
                    description: "Arduino Uno".to_string(),
                },
                PortInfo {
                    device: "/dev/ttyS0".to_string(),
                    description: "Serial Port".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_legacy_report() {
        let json = r#"[{"port": {"address": "COM4"}, "matching_boards": []}]"#;
        assert_eq!(
            parse_board_list(json).unwrap(),
            vec![PortInfo {
                device: "COM4".to_string(),
                description: "Unknown device".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_empty_reports() {
        assert!(parse_board_list("{}").unwrap().is_empty());
        assert!(parse_board_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_board_list("No boards found.").is_err());
    }
}
