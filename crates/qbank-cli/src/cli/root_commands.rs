use clap::Subcommand;

use crate::cli::subcommands::{QuestionCommands, VariantCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Questions.
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },
    /// Variant rows of a question.
    Variant {
        #[command(subcommand)]
        action: VariantCommands,
    },
}
