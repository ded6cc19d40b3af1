//! CLI argument parsing for the outreach pipeline.
use crate::paths::DEFAULT_DATA_DIR;
use crate::store::Collection;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_GENERATE_LIMIT: usize = 10;
pub const DEFAULT_PREVIEW_LIMIT: usize = 5;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "outreach",
    version,
    about = "Draft, review, and send outreach emails to NSF award PIs",
    after_help = "Commands:\n  scan       Count awards, keyword matches, and eligible PIs\n  explore    Browse awards and stage picks for generation\n  generate   Draft emails for unprocessed awards\n  review     Approve, skip, or edit drafts\n  preview    Print records from a collection\n  send       Send approved emails\n  status     Summarize pipeline progress\n\nExamples:\n  outreach scan --year 2024 --keywords \"machine learning,materials\"\n  outreach generate --year 2024 --keywords materials --limit 5\n  outreach review\n  outreach send --dry-run\n  outreach status --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Data root holding awards, staging, and status collections
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "OUTREACH_DATA_DIR",
        default_value = DEFAULT_DATA_DIR
    )]
    pub data_dir: PathBuf,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Scan(ScanArgs),
    Generate(GenerateArgs),
    Status(StatusArgs),
    Send(SendArgs),
    Preview(PreviewArgs),
    Review(ReviewArgs),
    Explore(ExploreArgs),
}

/// Collections selectable on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CollectionArg {
    Drafts,
    Approved,
    Sent,
    Skipped,
}

impl From<CollectionArg> for Collection {
    fn from(value: CollectionArg) -> Self {
        match value {
            CollectionArg::Drafts => Collection::Drafts,
            CollectionArg::Approved => Collection::Approved,
            CollectionArg::Sent => Collection::Sent,
            CollectionArg::Skipped => Collection::Skipped,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Count awards, keyword matches, and eligible PIs")]
pub struct ScanArgs {
    /// Award year (all years when omitted)
    #[arg(long, value_name = "YYYY")]
    pub year: Option<String>,

    /// Comma-separated keywords matched against title and abstract
    #[arg(long, value_name = "LIST")]
    pub keywords: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Generate draft emails for unprocessed awards")]
pub struct GenerateArgs {
    /// Award year to draw candidates from
    #[arg(long, value_name = "YYYY", required_unless_present = "from_staging")]
    pub year: Option<String>,

    /// Comma-separated keywords matched against title and abstract
    #[arg(long, value_name = "LIST", conflicts_with = "from_staging")]
    pub keywords: Option<String>,

    /// Maximum number of drafts to generate
    #[arg(long, default_value_t = DEFAULT_GENERATE_LIMIT)]
    pub limit: usize,

    /// Keep candidate order instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,

    /// Generate from staged awards instead of a year partition
    #[arg(long, conflicts_with = "year")]
    pub from_staging: bool,

    /// Seed for shuffling and variant selection
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(about = "Summarize pipeline progress")]
pub struct StatusArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Send approved emails")]
pub struct SendArgs {
    /// Maximum number of emails to send
    #[arg(long, default_value_t = usize::MAX, hide_default_value = true)]
    pub limit: usize,

    /// Delay between sends in milliseconds (settings file or 2000 by default)
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// List what would be sent without contacting the provider
    #[arg(long)]
    pub dry_run: bool,

    /// Sender address (overrides OUTREACH_FROM_EMAIL)
    #[arg(long, value_name = "EMAIL")]
    pub from_email: Option<String>,

    /// Sender display name (overrides OUTREACH_FROM_NAME)
    #[arg(long, value_name = "NAME")]
    pub from_name: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Print records from a collection")]
pub struct PreviewArgs {
    #[arg(long, value_enum, default_value = "drafts")]
    pub collection: CollectionArg,

    /// Print only this award id
    #[arg(long, value_name = "AWARD_ID")]
    pub id: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PREVIEW_LIMIT)]
    pub limit: usize,
}

#[derive(Parser, Debug)]
#[command(about = "Review drafts interactively (approve, skip, edit)")]
pub struct ReviewArgs {
    #[arg(long, value_enum, default_value = "drafts")]
    pub collection: CollectionArg,
}

#[derive(Parser, Debug)]
#[command(about = "Browse unprocessed awards and stage picks")]
pub struct ExploreArgs {
    #[arg(long, value_name = "YYYY")]
    pub year: String,

    /// Comma-separated keywords matched against title and abstract
    #[arg(long, value_name = "LIST")]
    pub keywords: Option<String>,
}
