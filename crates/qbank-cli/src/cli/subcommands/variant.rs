use clap::Subcommand;

/// Variant (child row) commands.
///
/// Content is passed as JSON tagged by `kind`, e.g.
/// `{"kind":"fill_in_blank_answer","answer":"went"}`.
#[derive(Clone, Debug, Subcommand)]
pub enum VariantCommands {
    /// Attach a child row to a question.
    Add {
        question_id: String,
        #[arg(long)]
        json: String,
    },
    /// Replace the content of a child row.
    Update {
        kind: String,
        id: String,
        #[arg(long)]
        json: String,
    },
    /// Delete a child row.
    Delete { kind: String, id: String },
    /// Get a child row.
    Get { kind: String, id: String },
    /// List child rows of one kind for a question.
    List { question_id: String, kind: String },
}
