//! Packer capability - the external program that transforms JavaScript
//!
//! The packing algorithm itself lives outside this crate. The pipeline only
//! needs the `Packer` contract: source in, packed source out, with an
//! encoding strength chosen by configuration. `CommandPacker` adapts any
//! command-line packer to that contract.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Encoding strength passed to the packer.
///
/// Wire values are the packer's own numeric levels; the serialized form is
/// the numeric string (`"0"`, `"10"`, `"62"`, `"95"`). Unknown values fall
/// back to `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingMode {
    /// No encoding, minification only
    None,
    /// Numeric keyword substitution
    Numeric,
    /// Base-62 encoding (the recommended default)
    #[default]
    Normal,
    /// High-ASCII encoding; breaks UTF-8 heavy sources
    HighAscii,
}

impl EncodingMode {
    /// Numeric level understood by the packer
    pub const fn level(&self) -> u8 {
        match self {
            EncodingMode::None => 0,
            EncodingMode::Numeric => 10,
            EncodingMode::Normal => 62,
            EncodingMode::HighAscii => 95,
        }
    }

    /// Human-readable name
    pub const fn display_name(&self) -> &'static str {
        match self {
            EncodingMode::None => "None",
            EncodingMode::Numeric => "Numeric",
            EncodingMode::Normal => "Normal",
            EncodingMode::HighAscii => "High ASCII",
        }
    }

    /// Parse a level or name; anything unrecognized maps to `Normal`
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "0" | "none" => EncodingMode::None,
            "10" | "numeric" => EncodingMode::Numeric,
            "95" | "high-ascii" | "high_ascii" | "high ascii" => EncodingMode::HighAscii,
            _ => EncodingMode::Normal,
        }
    }

    /// Map a numeric level; anything unrecognized maps to `Normal`
    pub fn from_level(level: u64) -> Self {
        match level {
            0 => EncodingMode::None,
            10 => EncodingMode::Numeric,
            95 => EncodingMode::HighAscii,
            _ => EncodingMode::Normal,
        }
    }
}

impl std::fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Serialize for EncodingMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.level().to_string())
    }
}

/// Accepts both the numeric wire form (`"62"`, `62`) and spelled-out names.
#[derive(Deserialize)]
#[serde(untagged)]
enum EncodingModeDe {
    Num(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for EncodingMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match EncodingModeDe::deserialize(deserializer)? {
            EncodingModeDe::Num(level) => EncodingMode::from_level(level),
            EncodingModeDe::Text(text) => EncodingMode::parse_lossy(&text),
        })
    }
}

/// Packer invocation errors
#[derive(Debug, Error)]
pub enum PackError {
    /// The packer command could not be started
    #[error("failed to run packer '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The packer exited unsuccessfully
    #[error("packer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The packer succeeded but produced nothing usable
    #[error("packer produced empty output")]
    EmptyOutput,
}

/// External packing capability.
///
/// Implementations are expected to be pure and synchronous: the same source
/// and mode always produce the same output, and a failure never leaves
/// partial state behind.
pub trait Packer {
    /// Transform JavaScript source at the given encoding strength
    fn pack(&self, source: &str, mode: EncodingMode) -> Result<String, PackError>;
}

/// Adapter for a command-line packer.
///
/// The configured command is run with its configured arguments plus the
/// numeric encoding level as the final argument. Source is piped to stdin,
/// packed output is read from stdout. A non-zero exit or empty stdout is a
/// failure.
#[derive(Debug, Clone)]
pub struct CommandPacker {
    command: String,
    args: Vec<String>,
}

impl CommandPacker {
    /// Create a new CommandPacker for the given command line
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// The configured command
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Packer for CommandPacker {
    fn pack(&self, source: &str, mode: EncodingMode) -> Result<String, PackError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(mode.level().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PackError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|source| PackError::Spawn {
                    command: self.command.clone(),
                    source,
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|source| PackError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PackError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let packed = String::from_utf8_lossy(&output.stdout).to_string();

        if packed.trim().is_empty() {
            return Err(PackError::EmptyOutput);
        }

        Ok(packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_levels_match_wire_values() {
        assert_eq!(EncodingMode::None.level(), 0);
        assert_eq!(EncodingMode::Numeric.level(), 10);
        assert_eq!(EncodingMode::Normal.level(), 62);
        assert_eq!(EncodingMode::HighAscii.level(), 95);
    }

    #[test]
    fn mode_parse_lossy_accepts_levels_and_names() {
        assert_eq!(EncodingMode::parse_lossy("0"), EncodingMode::None);
        assert_eq!(EncodingMode::parse_lossy("numeric"), EncodingMode::Numeric);
        assert_eq!(EncodingMode::parse_lossy("62"), EncodingMode::Normal);
        assert_eq!(
            EncodingMode::parse_lossy("High ASCII"),
            EncodingMode::HighAscii
        );
    }

    #[test]
    fn mode_parse_lossy_unknown_falls_back_to_normal() {
        assert_eq!(EncodingMode::parse_lossy("banana"), EncodingMode::Normal);
        assert_eq!(EncodingMode::parse_lossy(""), EncodingMode::Normal);
        assert_eq!(EncodingMode::parse_lossy("63"), EncodingMode::Normal);
    }

    #[test]
    fn mode_deserializes_from_string_and_integer() {
        let from_str: EncodingMode = serde_json::from_str("\"95\"").unwrap();
        assert_eq!(from_str, EncodingMode::HighAscii);

        let from_int: EncodingMode = serde_json::from_str("10").unwrap();
        assert_eq!(from_int, EncodingMode::Numeric);
    }

    #[test]
    fn mode_serializes_to_numeric_string() {
        let json = serde_json::to_string(&EncodingMode::Normal).unwrap();
        assert_eq!(json, "\"62\"");
    }

    #[cfg(unix)]
    #[test]
    fn command_packer_pipes_source_through() {
        let packer = CommandPacker::new("sh", vec!["-c".into(), "cat -".into()]);
        let packed = packer.pack("var x=1;", EncodingMode::Normal).unwrap();
        assert_eq!(packed, "var x=1;");
    }

    #[cfg(unix)]
    #[test]
    fn command_packer_receives_encoding_level() {
        // $0 is the level appended after the -c script
        let packer = CommandPacker::new("sh", vec!["-c".into(), "printf '%s' \"$0\"".into()]);
        let packed = packer.pack("ignored", EncodingMode::HighAscii).unwrap();
        assert_eq!(packed, "95");
    }

    #[cfg(unix)]
    #[test]
    fn command_packer_nonzero_exit_is_failure() {
        let packer = CommandPacker::new("sh", vec!["-c".into(), "exit 3".into()]);
        let err = packer.pack("var x=1;", EncodingMode::Normal).unwrap_err();
        assert!(matches!(err, PackError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn command_packer_empty_output_is_failure() {
        let packer = CommandPacker::new("sh", vec!["-c".into(), "true".into()]);
        let err = packer.pack("var x=1;", EncodingMode::Normal).unwrap_err();
        assert!(matches!(err, PackError::EmptyOutput));
    }

    #[test]
    fn command_packer_missing_binary_is_spawn_error() {
        let packer = CommandPacker::new("scriptpack-no-such-packer", vec![]);
        let err = packer.pack("var x=1;", EncodingMode::Normal).unwrap_err();
        assert!(matches!(err, PackError::Spawn { .. }));
    }
}
