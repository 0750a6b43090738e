use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "todolists", version, about = "Todo lists with progress tracking")]
pub struct Cli {
    /// SQLite database file (default: ~/.todo/todolists.sqlite)
    #[arg(long, global = true, env = "TODOLISTS_DB")]
    pub db: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Show all active lists with their progress
    Lists,
    /// Create an empty list
    CreateList { name: String },
    /// Show one list with its items
    Show { id: i64 },
    /// Add an item to a list
    AddItem {
        list: i64,
        name: String,
        #[arg(default_value = "")]
        text: String,
    },
    /// Rename, re-describe or (un)check an item
    UpdateItem {
        list: i64,
        item: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        text: String,
        /// true or false; omitted keeps the current state
        #[arg(long)]
        done: Option<bool>,
    },
    /// Soft delete an item
    DeleteItem { list: i64, item: i64 },
    /// Soft delete a list
    DeleteList { list: i64 },
    /// Interactive terminal UI
    Tui,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_update_item_with_done_flag() {
        let cli = Cli::try_parse_from([
            "todolists",
            "update-item",
            "1",
            "2",
            "--name",
            "Eggs",
            "--text",
            "free range",
            "--done",
            "true",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::UpdateItem {
                list: 1,
                item: 2,
                name: "Eggs".to_string(),
                text: "free range".to_string(),
                done: Some(true),
            }
        );
    }

    #[test]
    fn add_item_text_is_optional() {
        let cli = Cli::try_parse_from(["todolists", "add-item", "3", "Milk"]).unwrap();
        assert_eq!(
            cli.command,
            Command::AddItem {
                list: 3,
                name: "Milk".to_string(),
                text: String::new(),
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["todolists", "show", "4", "--json", "--db", "/tmp/t.sqlite"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.sqlite")));
        assert_eq!(cli.command, Command::Show { id: 4 });
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from(["todolists", "show", "groceries"]).is_err());
    }
}
