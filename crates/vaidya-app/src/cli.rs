use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vaidya", version, about = "Ayurvedic remedy assistant and appointment desk")]
pub struct Cli {
    /// Directory holding default.toml and the per-environment overrides
    #[arg(long, global = true, env = "VAIDYA_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask for remedies; the exchange is archived into the chat history
    Ask {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Print the formatted markup instead of the model text
        #[arg(long)]
        html: bool,
    },
    /// Archived conversations
    #[command(subcommand)]
    History(HistoryCommand),
    /// Doctor appointments
    #[command(subcommand)]
    Appointments(AppointmentCommand),
    /// Rate one answer of an archived conversation
    Feedback(FeedbackArgs),
    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List archived conversations, newest first
    List {
        /// Include entries past their expiry
        #[arg(long)]
        all: bool,
    },
    /// Print one conversation
    Show { id: i64 },
    /// Write the history to a timestamped JSON file in DIR
    Export { dir: PathBuf },
    /// Replace the history with the contents of FILE
    Import { file: PathBuf },
    Delete { id: i64 },
    /// Remove every conversation from both backends
    Clear,
    /// Dump a document-store collection as JSON
    Dump {
        #[arg(default_value = "chats", value_parser = ["chats", "appointments", "feedback"])]
        collection: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AppointmentCommand {
    List,
    Show { id: String },
    Book(BookArgs),
    /// Record a doctor's decision (confirmed, declined, ...)
    Respond { id: String, status: String },
}

#[derive(Debug, Args)]
pub struct BookArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub doctor: String,
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub time: String,
    /// Use this id instead of a generated one
    #[arg(long)]
    pub id: Option<i64>,
}

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    pub chat_id: i64,
    pub message_index: usize,
    #[arg(long, conflicts_with = "negative", required_unless_present = "negative")]
    pub positive: bool,
    #[arg(long)]
    pub negative: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["vaidya", "ask", "dry", "cough"]).unwrap();
        match cli.command {
            Command::Ask { query, html } => {
                assert_eq!(query.join(" "), "dry cough");
                assert!(!html);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.config_dir, PathBuf::from("config"));
    }

    #[test]
    fn test_feedback_needs_a_verdict() {
        assert!(Cli::try_parse_from(["vaidya", "feedback", "1", "0"]).is_err());
        assert!(Cli::try_parse_from(["vaidya", "feedback", "1", "0", "--positive", "--negative"]).is_err());

        let cli = Cli::try_parse_from(["vaidya", "feedback", "1", "0", "--negative"]).unwrap();
        let Command::Feedback(args) = cli.command else {
            panic!("expected feedback");
        };
        assert!(args.negative && !args.positive);
    }

    #[test]
    fn test_dump_rejects_unknown_collection() {
        assert!(Cli::try_parse_from(["vaidya", "history", "dump", "users"]).is_err());
    }
}
