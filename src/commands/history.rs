use super::open_history;
use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{OllachatError, Result};
use crate::storage::{ChatHistory, Conversation, HistoryStore, Role};
use colored::Colorize;
use prettytable::{format, Table};
use std::io::{self, BufRead, Write};

/// Handle history commands
pub fn handle_history(command: HistoryCommand, config: &Config) -> Result<()> {
    let store = HistoryStore::from_optional_path(config.storage.history_file.as_deref())?;
    let mut history = open_history(&store)?;

    match command {
        HistoryCommand::List => {
            print_history_table(&history);
            if !history.is_empty() {
                println!(
                    "Use {} to read one, or {} then {} to continue it.",
                    "ollachat history show <N>".cyan(),
                    "ollachat chat".cyan(),
                    "/load <N>".cyan()
                );
                println!();
            }
        }
        HistoryCommand::Show { index } => {
            let index = to_index(index, history.len())?;
            if let Some(conversation) = history.get(index) {
                print_conversation(conversation);
            }
        }
        HistoryCommand::Delete { index } => {
            let removed = history.remove_at(to_index(index, history.len())?)?;
            store.save(&history)?;
            println!("{}", format!("Deleted \"{}\"", removed.title).green());
        }
        HistoryCommand::Clear { yes } => {
            if history.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }
            let confirmed =
                yes || confirm(&format!("Delete all {} conversations?", history.len()))?;
            if !confirmed {
                println!("Nothing deleted.");
                return Ok(());
            }
            let count = history.len();
            history.clear();
            store.save(&history)?;
            println!("{}", format!("Deleted {} conversations", count).green());
        }
    }

    Ok(())
}

/// Convert a 1-based list position into an index
pub(crate) fn to_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        return Err(OllachatError::IndexOutOfRange {
            index: position,
            len,
        }
        .into());
    }
    Ok(position - 1)
}

/// Print saved conversations as a numbered table, newest first
pub fn print_history_table(history: &ChatHistory) {
    if history.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Title".bold(),
        "Last Message".bold(),
        "Model".bold(),
        "Messages".bold(),
        "Created".bold()
    ]);

    for (i, conversation) in history.iter().enumerate() {
        table.add_row(prettytable::row![
            (i + 1).to_string().cyan(),
            conversation.title,
            conversation.preview(),
            conversation.model,
            conversation.messages.len(),
            conversation.created_at.format("%Y-%m-%d %H:%M").to_string()
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
}

/// Print every message of one conversation
pub fn print_conversation(conversation: &Conversation) {
    println!(
        "\n{} ({}, {})\n",
        conversation.title.bold(),
        conversation.model,
        conversation.created_at.format("%Y-%m-%d %H:%M")
    );
    for message in &conversation.messages {
        let speaker = match message.role {
            Role::User => "You".green().bold(),
            Role::Assistant => "Assistant".cyan().bold(),
        };
        println!("[{}] {}: {}\n", message.timestamp, speaker, message.content);
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, sample_history, temp_dir};

    fn config_with_history(path: std::path::PathBuf) -> Config {
        let mut config = Config::default();
        config.storage.history_file = Some(path);
        config
    }

    #[test]
    fn test_to_index_is_one_based() {
        assert_eq!(to_index(1, 3).unwrap(), 0);
        assert_eq!(to_index(3, 3).unwrap(), 2);
    }

    #[test]
    fn test_to_index_rejects_zero_and_past_end() {
        assert_error_contains(to_index(0, 3), "No conversation at index 0");
        assert_error_contains(to_index(4, 3), "history holds 3");
    }

    #[test]
    fn test_delete_removes_and_saves() {
        let dir = temp_dir();
        let path = dir.path().join("history.json");
        let store = HistoryStore::new_with_path(&path).unwrap();
        store.save(&sample_history(&["a", "b", "c"])).unwrap();

        handle_history(
            HistoryCommand::Delete { index: 1 },
            &config_with_history(path),
        )
        .unwrap();

        let remaining = store.load().unwrap();
        let titles: Vec<_> = remaining.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn test_delete_out_of_range_leaves_file_alone() {
        let dir = temp_dir();
        let path = dir.path().join("history.json");
        let store = HistoryStore::new_with_path(&path).unwrap();
        store.save(&sample_history(&["a"])).unwrap();

        let result = handle_history(
            HistoryCommand::Delete { index: 2 },
            &config_with_history(path),
        );

        assert!(result.is_err());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_with_yes_empties_file() {
        let dir = temp_dir();
        let path = dir.path().join("history.json");
        let store = HistoryStore::new_with_path(&path).unwrap();
        store.save(&sample_history(&["a", "b"])).unwrap();

        handle_history(
            HistoryCommand::Clear { yes: true },
            &config_with_history(path),
        )
        .unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_list_without_file_succeeds() {
        let dir = temp_dir();
        let config = config_with_history(dir.path().join("missing.json"));
        assert!(handle_history(HistoryCommand::List, &config).is_ok());
    }
}
