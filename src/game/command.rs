//! Client commands.
//!
//! Session layers receive commands as small JSON objects such as
//! `{"command": "move", "parameter": "N"}` and hand them to
//! [`Game::issue_command_json`](super::Game::issue_command_json), which
//! publishes them as [`EventKind::Command`](crate::events::EventKind::Command).

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Result};

/// A decoded client command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Command name.
    pub command: String,

    /// Raw parameter; empty when the client sent none.
    #[serde(default)]
    pub parameter: String,
}

impl CommandRequest {
    /// Create a command.
    pub fn new(command: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            parameter: parameter.into(),
        }
    }
}

/// Decode a command from JSON.
///
/// # Errors
///
/// Returns [`EngineError::CommandParse`] if the text is not a JSON object
/// with a string `command` field.
pub fn parse_command_json(json: &str) -> Result<CommandRequest> {
    serde_json::from_str(json).map_err(|err| EngineError::CommandParse(err.to_string()))
}
