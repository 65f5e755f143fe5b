//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use teoremer_domain::{DraftStatus, ItemType};

/// Teoremer CLI - Draft, review, publish and cite mathematical items.
#[derive(Debug, Parser)]
#[command(name = "teoremer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database file path
    #[arg(long, global = true, env = "TEOREMER_DB")]
    pub db: Option<String>,

    /// Act as this user
    #[arg(long = "as", global = true, env = "TEOREMER_USER")]
    pub as_user: Option<String>,

    /// Log more (repeat for more)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage users
    User(UserArgs),

    /// Write, review and publish drafts
    Draft(DraftArgs),

    /// Browse published items
    Item(ItemArgs),

    /// Register media files
    Media(MediaArgs),

    /// Manage sources and citations
    Source(SourceArgs),

    /// Show item counts
    Stats,
}

/// Arguments for user management.
#[derive(Debug, Parser)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

/// User management actions.
#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Register a user
    Add {
        /// Unique user name
        name: String,
    },

    /// List all users
    List,

    /// Show a user's published items and drafts
    Show {
        /// User name (defaults to --as)
        name: Option<String>,
    },
}

/// Arguments for draft commands.
#[derive(Debug, Parser)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub action: DraftAction,
}

/// Draft lifecycle actions.
#[derive(Debug, Subcommand)]
pub enum DraftAction {
    /// Start a new draft
    New {
        /// Item type
        #[arg(value_enum)]
        itemtype: ItemTypeArg,

        /// Body text
        #[arg(conflicts_with = "file")]
        body: Option<String>,

        /// Read the body from a file
        #[arg(long)]
        file: Option<String>,

        /// Theorem proved (proofs only)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Replace a draft's body
    Edit {
        /// Draft ID
        id: u64,

        /// New body text
        #[arg(conflicts_with = "file")]
        body: Option<String>,

        /// Read the body from a file
        #[arg(long)]
        file: Option<String>,
    },

    /// Show a draft
    Show {
        /// Draft ID
        id: u64,
    },

    /// List your drafts
    List {
        /// Filter by item type
        #[arg(short = 't', long = "type", value_enum)]
        itemtype: Option<ItemTypeArg>,

        /// Filter by status
        #[arg(short, long, value_enum)]
        status: Option<DraftStatusArg>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Run the publish checks without publishing
    Check {
        /// Draft ID
        id: u64,
    },

    /// Submit a draft for review
    Review {
        /// Draft ID
        id: u64,
    },

    /// Send a draft in review back to draft
    Revert {
        /// Draft ID
        id: u64,
    },

    /// Publish a draft
    Publish {
        /// Draft ID
        id: u64,
    },

    /// Delete a draft
    Delete {
        /// Draft ID
        id: u64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Arguments for published items.
#[derive(Debug, Parser)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub action: ItemAction,
}

/// Published item actions.
#[derive(Debug, Subcommand)]
pub enum ItemAction {
    /// Show an item with its evidence
    Show {
        /// Item ID (e.g. T42)
        id: String,
    },

    /// List published items
    List {
        /// Filter by item type
        #[arg(short = 't', long = "type", value_enum)]
        itemtype: Option<ItemTypeArg>,

        /// Only proofs of this theorem
        #[arg(short, long)]
        parent: Option<String>,

        /// Only items by this user
        #[arg(long)]
        by: Option<String>,

        /// List suspended items instead
        #[arg(long)]
        suspended: bool,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Suspend a published item
    Suspend {
        /// Item ID
        id: String,

        /// Reinstate instead of suspending
        #[arg(long)]
        restore: bool,
    },
}

/// Arguments for media commands.
#[derive(Debug, Parser)]
pub struct MediaArgs {
    #[command(subcommand)]
    pub action: MediaAction,
}

/// Media actions.
#[derive(Debug, Subcommand)]
pub enum MediaAction {
    /// Register a media file under a public id
    Add {
        /// Public id used in [text!ID] markers
        id: String,

        /// File path
        path: String,

        /// Register as a thumbnail rather than the original
        #[arg(long)]
        thumbnail: bool,
    },
}

/// Arguments for source commands.
#[derive(Debug, Parser)]
pub struct SourceArgs {
    #[command(subcommand)]
    pub action: SourceAction,
}

/// Source and citation actions.
#[derive(Debug, Subcommand)]
pub enum SourceAction {
    /// Register a bibliographic source
    Add(SourceFields),

    /// List sources
    List,

    /// Show a source and the items citing it
    Show {
        /// Source ID
        id: u64,
    },

    /// Cite a source as evidence for an item or draft
    Cite {
        /// Source ID
        source: u64,

        /// Published item supported
        #[arg(long, conflicts_with = "draft", required_unless_present = "draft")]
        item: Option<String>,

        /// Draft supported
        #[arg(long)]
        draft: Option<u64>,

        /// Where in the source (page, chapter, ...)
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Endorse an existing citation
    Endorse {
        /// Validation ID
        validation: String,
    },
}

/// Descriptive fields of a new source.
#[derive(Debug, Parser)]
pub struct SourceFields {
    /// Source type (book, article, ...)
    pub sourcetype: String,

    /// Author, in citation order (repeatable)
    #[arg(short, long = "author")]
    pub authors: Vec<String>,

    /// Editor, in citation order (repeatable)
    #[arg(short, long = "editor")]
    pub editors: Vec<String>,

    /// Title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Publisher
    #[arg(long)]
    pub publisher: Option<String>,

    /// Year
    #[arg(short, long)]
    pub year: Option<String>,

    /// Volume
    #[arg(long)]
    pub volume: Option<String>,

    /// Number
    #[arg(long)]
    pub number: Option<String>,

    /// Series
    #[arg(long)]
    pub series: Option<String>,

    /// Publisher address
    #[arg(long)]
    pub address: Option<String>,

    /// Edition
    #[arg(long)]
    pub edition: Option<String>,

    /// Month
    #[arg(long)]
    pub month: Option<String>,

    /// Journal
    #[arg(long)]
    pub journal: Option<String>,

    /// Pages
    #[arg(long)]
    pub pages: Option<String>,

    /// ISBN-10
    #[arg(long)]
    pub isbn10: Option<String>,

    /// ISBN-13
    #[arg(long)]
    pub isbn13: Option<String>,

    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,
}

/// Item type argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ItemTypeArg {
    /// Definition
    Definition,
    /// Theorem
    Theorem,
    /// Proof of a theorem
    Proof,
}

/// Draft status argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DraftStatusArg {
    /// Being written
    Draft,
    /// Submitted for review
    Review,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ItemTypeArg> for ItemType {
    fn from(itemtype: ItemTypeArg) -> Self {
        match itemtype {
            ItemTypeArg::Definition => ItemType::Definition,
            ItemTypeArg::Theorem => ItemType::Theorem,
            ItemTypeArg::Proof => ItemType::Proof,
        }
    }
}

impl From<DraftStatusArg> for DraftStatus {
    fn from(status: DraftStatusArg) -> Self {
        match status {
            DraftStatusArg::Draft => DraftStatus::Draft,
            DraftStatusArg::Review => DraftStatus::Review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_new_command() {
        let cli = Cli::parse_from(["teoremer", "--as", "alice", "draft", "new", "definition", "A set ..."]);
        assert_eq!(cli.as_user.as_deref(), Some("alice"));
        match cli.command {
            Command::Draft(DraftArgs {
                action: DraftAction::New { itemtype, body, .. },
            }) => {
                assert!(matches!(itemtype, ItemTypeArg::Definition));
                assert_eq!(body.as_deref(), Some("A set ..."));
            }
            _ => panic!("Expected Draft New command"),
        }
    }

    #[test]
    fn test_cite_needs_a_target() {
        assert!(Cli::try_parse_from(["teoremer", "source", "cite", "1"]).is_err());
        assert!(Cli::try_parse_from(["teoremer", "source", "cite", "1", "--item", "T1", "--draft", "2"]).is_err());

        let cli = Cli::try_parse_from(["teoremer", "source", "cite", "1", "--item", "T1", "-l", "p. 4"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Source(SourceArgs {
                action: SourceAction::Cite { .. }
            })
        ));
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["teoremer", "-vv", "stats"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_itemtype_conversion() {
        let itemtype: ItemType = ItemTypeArg::Proof.into();
        assert_eq!(itemtype, ItemType::Proof);
    }
}
