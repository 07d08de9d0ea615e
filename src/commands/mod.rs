/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes these top-level command modules:

- `serve`   - Run the relay server
- `chat`    - Interactive chat mode
- `history` - List, show, and delete saved conversations
- `status`  - Probe the relay and the backend
*/

use crate::config::Config;
use crate::error::{OllachatError, Result};
use crate::storage::{ChatHistory, HistoryStore};
use colored::Colorize;

// Special commands parser for the chat loop
pub mod special_commands;

// Saved conversation commands
pub mod history;

// Relay status probe
pub mod status;

/// Load the history file, recovering from a corrupt one.
///
/// A file that does not parse is reported, moved aside to `<file>.corrupt`,
/// and replaced by an empty history. Other read failures are returned.
pub fn open_history(store: &HistoryStore) -> Result<ChatHistory> {
    match store.load() {
        Ok(history) => Ok(history),
        Err(e) => match e.downcast_ref::<OllachatError>() {
            Some(OllachatError::CorruptHistory { .. }) => {
                eprintln!("{}", format!("Warning: {}", e).yellow());
                let moved = store.quarantine_corrupt()?;
                eprintln!(
                    "{}",
                    format!(
                        "The unreadable file was moved to {}. Starting with an empty history.\n",
                        moved.display()
                    )
                    .yellow()
                );
                Ok(ChatHistory::new())
            }
            _ => Err(e),
        },
    }
}

// Relay server command handler
pub mod serve {
    //! Relay server handler.
    //!
    //! Applies the `--bind` override, checks the address, and serves until
    //! the process is stopped.

    use super::*;
    use crate::relay;

    /// Start the relay server
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `bind` - Optional override for `relay.bind`
    pub async fn run_serve(mut config: Config, bind: Option<String>) -> Result<()> {
        if let Some(bind) = bind {
            tracing::debug!("Using bind override: {}", bind);
            config.relay.bind = bind;
        }

        println!(
            "Relaying {} -> {}",
            format!("http://{}/chat", config.relay.bind).cyan(),
            config.relay.backend_url
        );
        println!("Default model: {}\n", config.relay.default_model);

        relay::serve(&config.relay).await
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Builds the relay and the history store, hands both to a
    //! `ChatController`, and runs a readline-based loop that sends each line
    //! to the model or handles it as a special command.

    use super::history::{print_conversation, print_history_table, to_index};
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::status::indicator;
    use super::*;
    use crate::chat::{ChatController, SaveStatus, TurnOutcome, STARTER_PROMPTS};
    use crate::providers::create_relay;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `model` - Optional model to start with instead of `relay.default_model`
    /// * `direct` - Call the backend directly instead of going through the relay
    pub async fn run_chat(config: Config, model: Option<String>, direct: bool) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let model = model.unwrap_or_else(|| config.relay.default_model.clone());
        ensure_known_model(&config, &model)?;

        let relay = create_relay(&config, direct)?;
        let store = HistoryStore::from_optional_path(config.storage.history_file.as_deref())?;
        tracing::debug!("Using history file {}", store.path().display());
        let history = open_history(&store)?;

        let mut controller =
            ChatController::new(relay, store, history, model, config.chat.failure_policy)
                .with_turn_timeout(config.client.request_timeout());

        let online = controller.relay().is_online().await;
        print_welcome_banner(&controller, online, direct);

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = format!("[{}] > ", controller.session().model().cyan());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::NewChat => {
                            report_save(&controller.new_chat());
                            println!("{}\n", "Started a new chat.".green());
                            print_starter_prompts();
                            continue;
                        }
                        SpecialCommand::ListHistory => {
                            print_history_table(controller.history());
                            continue;
                        }
                        SpecialCommand::LoadConversation(position) => {
                            let loaded = to_index(position, controller.history().len())
                                .and_then(|index| controller.load(index).cloned());
                            match loaded {
                                Ok(conversation) => print_conversation(&conversation),
                                Err(e) => eprintln!("{}\n", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::DeleteConversation(position) => {
                            let removal = to_index(position, controller.history().len())
                                .and_then(|index| controller.delete(index));
                            match removal {
                                Ok(removal) => {
                                    println!(
                                        "{}",
                                        format!("Deleted \"{}\"", removal.removed.title).green()
                                    );
                                    if removal.cleared_active {
                                        println!("That was the current chat; starting a new one.");
                                    }
                                    report_save(&removal.save);
                                    println!();
                                }
                                Err(e) => eprintln!("{}\n", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::ClearHistory => {
                            let count = controller.history().len();
                            let question =
                                format!("Delete all {} saved conversations? [y/N] ", count);
                            let answer = rl.readline(&question).unwrap_or_default();
                            if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                                report_save(&controller.clear_history());
                                println!(
                                    "{}\n",
                                    format!("Deleted {} conversations", count).green()
                                );
                            } else {
                                println!("Nothing deleted.\n");
                            }
                            continue;
                        }
                        SpecialCommand::ShowModel => {
                            println!("Current model: {}\n", controller.session().model().cyan());
                            continue;
                        }
                        SpecialCommand::SwitchModel(name) => {
                            match ensure_known_model(&config, &name) {
                                Ok(()) => {
                                    let old = controller.session().model().to_string();
                                    controller.select_model(name.clone());
                                    println!("Switched from {} to {}\n", old, name.cyan());
                                }
                                Err(e) => eprintln!("{}\n", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::ListModels => {
                            print_models(&config, controller.session().model());
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            let online = controller.relay().is_online().await;
                            print_status_display(&controller, online, direct);
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            // Regular prompt
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    println!("{}", "Thinking...".dimmed());
                    match controller.send(trimmed).await {
                        TurnOutcome::Replied { reply, save } => {
                            println!("\n{}\n", reply);
                            report_save(&save);
                        }
                        TurnOutcome::Failed { notice, .. } => {
                            eprintln!("\n{}\n", notice.red());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Reject models that the configuration does not offer
    pub(crate) fn ensure_known_model(config: &Config, model: &str) -> Result<()> {
        if config.client.models.iter().any(|m| m == model) {
            Ok(())
        } else {
            Err(OllachatError::Config(format!(
                "Unknown model {}. Available: {}",
                model,
                config.client.models.join(", ")
            ))
            .into())
        }
    }

    fn report_save(save: &SaveStatus) {
        match save {
            SaveStatus::Failed(reason) => {
                eprintln!(
                    "{}",
                    format!("Warning: chat history was not saved: {}", reason).yellow()
                );
            }
            SaveStatus::Inserted(id) => tracing::debug!("Stored new conversation {}", id),
            SaveStatus::Updated(id) => tracing::debug!("Updated conversation {}", id),
            SaveStatus::Saved | SaveStatus::NotSaved => {}
        }
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(controller: &ChatController, online: bool, direct: bool) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║            Ollachat Interactive Chat - Welcome!              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "{}: {}",
            if direct { "Backend" } else { "Relay" },
            indicator(online)
        );
        println!("Model:  {}", controller.session().model().cyan());
        println!("Saved:  {} conversations\n", controller.history().len());
        print_starter_prompts();
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_starter_prompts() {
        println!("Try asking:");
        for prompt in STARTER_PROMPTS {
            println!("  - {}", prompt.italic());
        }
        println!();
    }

    fn print_models(config: &Config, current: &str) {
        println!("\nAvailable models:");
        for model in &config.client.models {
            if model == current {
                println!("  * {}", model.cyan().bold());
            } else {
                println!("    {}", model);
            }
        }
        println!();
    }

    /// Display detailed status information about the current session
    fn print_status_display(controller: &ChatController, online: bool, direct: bool) {
        let session = controller.session();

        println!("\nSession Status:");
        println!("===============\n");
        println!(
            "{}:      {}",
            if direct { "Backend" } else { "Relay" },
            indicator(online)
        );
        println!("Model:      {}", session.model().cyan());
        println!("State:      {}", session.phase());
        println!("Messages:   {}", session.messages().len());
        println!(
            "Saved as:   {}",
            session.conversation_id().unwrap_or("(not saved yet)")
        );
        println!(
            "History:    {} conversations in {}",
            controller.history().len(),
            controller.store().path().display()
        );
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::test_utils::assert_error_contains;

        #[test]
        fn test_ensure_known_model_accepts_configured() {
            let config = Config::default();
            assert!(ensure_known_model(&config, "mistral").is_ok());
        }

        #[test]
        fn test_ensure_known_model_rejects_unlisted() {
            let config = Config::default();
            assert_error_contains(ensure_known_model(&config, "gpt-4"), "Unknown model gpt-4");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_history, temp_dir};

    #[test]
    fn test_open_history_reads_existing_file() {
        let dir = temp_dir();
        let store = HistoryStore::new_with_path(dir.path().join("h.json")).unwrap();
        store.save(&sample_history(&["a"])).unwrap();

        assert_eq!(open_history(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_open_history_quarantines_corrupt_file() {
        let dir = temp_dir();
        let path = dir.path().join("h.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = HistoryStore::new_with_path(&path).unwrap();

        let history = open_history(&store).unwrap();

        assert!(history.is_empty());
        assert!(!path.exists());
        assert!(dir.path().join("h.json.corrupt").exists());
    }
}
