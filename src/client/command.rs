//! Command definitions
//!
//! Parses the whitespace-separated command lines typed at the client prompt.

use std::str::FromStr;

use crate::error::FtpError;

/// A command typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// `put <path>`: upload a local file
    Put { path: String },

    /// `get <name>`: download a file from the server
    Get { name: String },

    /// `change <old> <new>`: rename a file on the server
    Change { old_name: String, new_name: String },

    /// `help`: ask the server for the command listing
    Help,

    /// `bye`: close the connection
    Bye,
}

impl UserCommand {
    /// Keyword that starts this command on the prompt
    pub fn keyword(&self) -> &'static str {
        match self {
            UserCommand::Put { .. } => "put",
            UserCommand::Get { .. } => "get",
            UserCommand::Change { .. } => "change",
            UserCommand::Help => "help",
            UserCommand::Bye => "bye",
        }
    }
}

fn arity_error(keyword: &str, usage: &str) -> FtpError {
    FtpError::Command(format!(
        "wrong number of arguments for '{}', usage: {} (type help for the list of commands)",
        keyword, usage
    ))
}

impl FromStr for UserCommand {
    type Err = FtpError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (keyword, args) = match tokens.split_first() {
            Some((keyword, args)) => (*keyword, args),
            None => return Err(FtpError::Command("empty command".to_string())),
        };

        match (keyword.to_ascii_lowercase().as_str(), args) {
            ("put", [path]) => Ok(UserCommand::Put {
                path: path.to_string(),
            }),
            ("put", _) => Err(arity_error("put", "put <path>")),
            ("get", [name]) => Ok(UserCommand::Get {
                name: name.to_string(),
            }),
            ("get", _) => Err(arity_error("get", "get <name>")),
            ("change", [old_name, new_name]) => Ok(UserCommand::Change {
                old_name: old_name.to_string(),
                new_name: new_name.to_string(),
            }),
            ("change", _) => Err(arity_error("change", "change <old> <new>")),
            ("help", []) => Ok(UserCommand::Help),
            ("help", _) => Err(arity_error("help", "help")),
            ("bye", []) => Ok(UserCommand::Bye),
            ("bye", _) => Err(arity_error("bye", "bye")),
            (other, _) => Err(FtpError::Command(format!(
                "unknown command '{}' (type help for the list of commands)",
                other
            ))),
        }
    }
}
