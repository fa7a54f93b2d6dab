use clap::Subcommand;

/// Question (parent record) commands.
#[derive(Clone, Debug, Subcommand)]
pub enum QuestionCommands {
    /// Create a question.
    Create {
        /// Question type, e.g. fill_in_blank or choice-one.
        #[arg(long = "type")]
        question_type: String,
        #[arg(long)]
        instruction: String,
        #[arg(long)]
        topic: Vec<String>,
        #[arg(long = "image-url")]
        image_url: Vec<String>,
        /// Time limit in seconds.
        #[arg(long)]
        max_time: u32,
    },
    /// Get a question with its variant payload.
    Get { id: String },
    /// Update parent fields. Bumps the version when anything changes.
    Update {
        id: String,
        #[arg(long)]
        instruction: Option<String>,
        /// Replaces the topic list when given.
        #[arg(long)]
        topic: Vec<String>,
        /// Remove every topic.
        #[arg(long, conflicts_with = "topic")]
        clear_topic: bool,
        /// Replaces the image list when given.
        #[arg(long = "image-url")]
        image_url: Vec<String>,
        /// Remove every image URL.
        #[arg(long, conflicts_with = "image_url")]
        clear_image_urls: bool,
        #[arg(long)]
        max_time: Option<u32>,
    },
    /// Delete a question and all its variant rows.
    Delete { id: String },
    /// List questions, most recently updated first.
    List,
    /// Search the index.
    Search {
        /// Free text matched against instruction, topic, and content.
        text: Option<String>,
        #[arg(long = "type")]
        question_type: Option<String>,
        #[arg(long)]
        skill: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Return questions newer than the given `ID:VERSION` pairs.
    ChangedSince {
        #[arg(required = true)]
        pairs: Vec<String>,
    },
    /// Rebuild cache and search entries for every question.
    Reindex,
}
