use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "flashcards")]
#[command(version)]
#[command(about = "flash cards on disk: a question on the front, an answer on the back", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Cards folder to use
    #[arg(short, long, global = true, env = "FLASHCARDS_FOLDER")]
    pub folder: Option<String>,

    /// Do not ask for confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Log what the store does (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the cards in the folder (default if no command)
    List {
        /// Limit results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Sort by last modification instead of name
        #[arg(short, long)]
        datesort: bool,

        /// Reverse sort
        #[arg(short, long)]
        reverse: bool,

        /// Output as YAML
        #[arg(long)]
        yaml: bool,

        /// Condensed output
        #[arg(short, long)]
        condensed: bool,
    },

    /// Show both sides of a card
    Show {
        /// Card name, with or without .card
        name: String,

        /// Output as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Create a card
    New {
        /// Card name, with or without .card
        name: String,

        /// Question side
        #[arg(short, long, default_value = "")]
        question: String,

        /// Answer side
        #[arg(short, long, default_value = "")]
        answer: String,

        /// Write the card in $VISUAL/$EDITOR
        #[arg(short, long)]
        editor: bool,

        /// Refuse to replace an existing card
        #[arg(long)]
        no_clobber: bool,
    },

    /// Change a card
    Edit {
        /// Card name
        name: String,

        /// New question
        #[arg(short, long)]
        question: Option<String>,

        /// New answer
        #[arg(short, long)]
        answer: Option<String>,

        /// Edit the card in $VISUAL/$EDITOR
        #[arg(short, long)]
        editor: bool,
    },

    /// Delete a card
    Delete {
        /// Card name(s)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Rename a card
    Rename {
        /// Current name
        name: String,

        /// New name
        new_name: String,

        /// Refuse to replace an existing card
        #[arg(long)]
        no_clobber: bool,
    },

    /// Go through cards one side at a time
    Play {
        /// Cards to play, all of them if none are given
        names: Vec<String>,

        /// Shuffle the cards first
        #[arg(short, long)]
        shuffle: bool,
    },

    /// Search cards
    Search {
        /// Pattern to search for
        pattern: String,

        /// Search the answers as well
        #[arg(short, long)]
        answer: bool,

        /// Use regex
        #[arg(short, long)]
        regex: bool,
    },

    /// Show folder info
    Info,
}
