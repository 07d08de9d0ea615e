//! Special commands parser for interactive chat mode
//!
//! This module parses the commands that can be entered during an
//! interactive chat session instead of a prompt. Special commands let the
//! user start a new chat, browse and edit saved conversations, pick a model,
//! and check the relay.
//!
//! Commands are prefixed with `/` and are case-insensitive. Conversation
//! positions are 1-based, matching what `/history` prints.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session or the saved history rather than
/// being sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start an empty session, saving the current one first if needed
    NewChat,

    /// Show saved conversations, newest first
    ListHistory,

    /// Continue the saved conversation at a 1-based position
    LoadConversation(usize),

    /// Delete the saved conversation at a 1-based position
    DeleteConversation(usize),

    /// Delete every saved conversation
    ClearHistory,

    /// Show the selected model
    ShowModel,

    /// Switch the model used for the following turns
    SwitchModel(String),

    /// List the models offered by the configuration
    ListModels,

    /// Show relay reachability and session state
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a prompt.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognized `/` command,
/// `CommandError::MissingArgument` when `/load` or `/delete` lack a
/// position, and `CommandError::UnsupportedArgument` when a position is not
/// a positive integer or a command takes no argument.
///
/// # Examples
///
/// ```
/// use ollachat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
/// assert_eq!(
///     parse_special_command("/load 2").unwrap(),
///     SpecialCommand::LoadConversation(2)
/// );
/// assert_eq!(
///     parse_special_command("/model Mistral").unwrap(),
///     SpecialCommand::SwitchModel("Mistral".to_string())
/// );
/// assert_eq!(
///     parse_special_command("hello there").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // Only "/..." lines and the bare exit words are commands
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match command.as_str() {
        "/new" => no_argument(&command, arg, SpecialCommand::NewChat),
        "/history" => no_argument(&command, arg, SpecialCommand::ListHistory),
        "/clear" => no_argument(&command, arg, SpecialCommand::ClearHistory),
        "/models" => no_argument(&command, arg, SpecialCommand::ListModels),
        "/status" => no_argument(&command, arg, SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "/load" => parse_position(&command, arg).map(SpecialCommand::LoadConversation),
        "/delete" => parse_position(&command, arg).map(SpecialCommand::DeleteConversation),

        "/model" if arg.is_empty() => Ok(SpecialCommand::ShowModel),
        "/model" => Ok(SpecialCommand::SwitchModel(arg.to_string())),

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn no_argument(
    command: &str,
    arg: &str,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        })
    }
}

fn parse_position(command: &str, arg: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: format!("{} <number from /history>", command),
        });
    }

    match arg.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CONVERSATIONS:
  /new            - Start a new chat (the current one is kept in history)
  /history        - List saved conversations, newest first
  /load <n>       - Continue conversation number n from /history
  /delete <n>     - Delete conversation number n
  /clear          - Delete all saved conversations

MODELS:
  /model          - Show the selected model
  /model <name>   - Switch to a different model
  /models         - List the models you can switch to

SESSION:
  /status         - Show relay status and the current session
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent to the model
  - Conversations are saved after every successful reply
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("Explain quantum computing").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("exit now").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        assert_eq!(
            parse_special_command("/NEW").unwrap(),
            SpecialCommand::NewChat
        );
        assert_eq!(
            parse_special_command("  /History ").unwrap(),
            SpecialCommand::ListHistory
        );
        assert_eq!(parse_special_command("QUIT").unwrap(), SpecialCommand::Exit);
    }

    #[test]
    fn test_exit_aliases() {
        for input in ["exit", "quit", "/exit", "/quit"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_help_aliases() {
        assert_eq!(
            parse_special_command("/help").unwrap(),
            SpecialCommand::Help
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_load_and_delete_positions() {
        assert_eq!(
            parse_special_command("/load 3").unwrap(),
            SpecialCommand::LoadConversation(3)
        );
        assert_eq!(
            parse_special_command("/delete 1").unwrap(),
            SpecialCommand::DeleteConversation(1)
        );
    }

    #[test]
    fn test_position_missing() {
        let err = parse_special_command("/load").unwrap_err();
        assert!(matches!(
            err,
            CommandError::MissingArgument { ref command, .. } if command == "/load"
        ));
    }

    #[test]
    fn test_position_must_be_positive_integer() {
        for input in ["/delete 0", "/delete -1", "/load two"] {
            assert!(matches!(
                parse_special_command(input),
                Err(CommandError::UnsupportedArgument { .. })
            ));
        }
    }

    #[test]
    fn test_model_without_argument_shows_model() {
        assert_eq!(
            parse_special_command("/model").unwrap(),
            SpecialCommand::ShowModel
        );
    }

    #[test]
    fn test_model_argument_keeps_case() {
        assert_eq!(
            parse_special_command("/MODEL  Neural-Chat ").unwrap(),
            SpecialCommand::SwitchModel("Neural-Chat".to_string())
        );
    }

    #[test]
    fn test_argument_on_plain_command_is_rejected() {
        let err = parse_special_command("/clear all").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnsupportedArgument {
                command: "/clear".to_string(),
                arg: "all".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_special_command("/mode write").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/mode".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
