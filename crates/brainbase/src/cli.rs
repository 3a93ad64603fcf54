//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Brainbase operational tools
///
/// Airtable to NocoDB migration, SSOT imports and X posting. Every command
/// runs once and exits.
#[derive(Parser, Debug)]
#[command(name = "brainbase-ops", author, version, about, long_about = None)]
pub struct Cli {
    /// `.env` file to load (default: search the current directory and its parents)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Workspace configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.yml")]
    pub config: PathBuf,

    /// Log directory path (defaults to OS-specific location)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Debug level logging unless `RUST_LOG` says otherwise
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Migrate Airtable bases into NocoDB
    Migrate(MigrateArgs),

    /// Print the column mapping of every base without writing anything
    Plan {
        /// Only this base (name or id)
        #[arg(long)]
        base: Option<String>,
    },

    /// Order columns as primary key, regular, system
    ReorderColumns {
        /// NocoDB table ids
        #[arg(required = true)]
        table_ids: Vec<String>,
    },

    /// Re-send Airtable records to NocoDB tables that came out short
    InsertMissing(TableSetArgs),

    /// Delete every record of the given NocoDB tables
    PurgeRecords {
        /// NocoDB table ids
        #[arg(required = true)]
        table_ids: Vec<String>,
    },

    /// Compare Airtable and NocoDB record counts
    Status(TableSetArgs),

    /// Upsert the members directory into the SSOT database
    ImportMembers {
        /// members.yml (default: $CODEX_PATH/common/meta/slack/members.yml)
        #[arg(long)]
        members: Option<PathBuf>,
    },

    /// Insert business card contacts into the SSOT graph
    ImportContacts {
        /// Parse and list only
        #[arg(long)]
        dry_run: bool,

        /// CSV files (default: every *.csv in $CODEX_PATH/common/meta/contacts/data)
        files: Vec<PathBuf>,
    },

    /// Post to X with a generated infographic
    Post(PostArgs),

    /// Check the X credentials
    VerifyX {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate an infographic image only
    Infographic {
        #[arg(long)]
        topic: String,

        /// Key point (repeatable)
        #[arg(long = "point", required = true)]
        points: Vec<String>,

        /// Output file (default: $SNS_DIR/images/infographic_<timestamp>.png)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

impl Command {
    /// Subcommand name as typed, for the run span
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Migrate(_) => "migrate",
            Self::Plan { .. } => "plan",
            Self::ReorderColumns { .. } => "reorder-columns",
            Self::InsertMissing(_) => "insert-missing",
            Self::PurgeRecords { .. } => "purge-records",
            Self::Status(_) => "status",
            Self::ImportMembers { .. } => "import-members",
            Self::ImportContacts { .. } => "import-contacts",
            Self::Post(_) => "post",
            Self::VerifyX { .. } => "verify-x",
            Self::Infographic { .. } => "infographic",
        }
    }
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Only this base (name or id); overrides the skip list
    #[arg(long)]
    pub base: Option<String>,

    /// Where to write the JSON report
    #[arg(long, default_value = brainbase_migration::report::DEFAULT_REPORT_FILE)]
    pub report: PathBuf,

    /// Fetch and map only; nothing is written to NocoDB
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct TableSetArgs {
    /// Airtable base id
    #[arg(long)]
    pub airtable_base: String,

    /// NocoDB base id
    #[arg(long)]
    pub nocodb_base: String,

    /// Table titles, identical on both sides
    #[arg(required = true)]
    pub tables: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Hook line; infographic title and post log topic
    #[arg(long, short = 't')]
    pub title: String,

    /// Tweet text
    #[arg(long, short = 'b')]
    pub body: String,

    /// Infographic point (repeatable); extracted from the body when omitted
    #[arg(long = "point", short = 'p')]
    pub points: Vec<String>,

    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub skip_image: bool,

    /// Attach this image instead of generating one
    #[arg(long, short = 'i')]
    pub image: Option<PathBuf>,

    /// Only append to today's draft file
    #[arg(long)]
    pub save_draft: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}
