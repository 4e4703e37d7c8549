use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sn", about = concat!("[#] snip v", env!("CARGO_PKG_VERSION"), " - your snippets, close at hand"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new snippet
    Add(AddArgs),
    /// List snippets in a view (all, pinned, trash)
    List(ListArgs),
    /// Show a snippet in full
    Show(ShowArgs),
    /// Search snippets by text or keyword
    Search(SearchArgs),
    /// Edit a snippet's text or keywords
    Edit(EditArgs),
    /// Pin a snippet to the top of listings
    Pin(IdArg),
    /// Unpin a snippet
    Unpin(IdArg),
    /// Copy a snippet's text to the clipboard
    Copy(IdArg),
    /// Move a snippet to the trash
    Rm(IdArg),
    /// Restore a snippet from the trash
    Restore(IdArg),
    /// Permanently delete snippets
    Delete(DeleteArgs),
    /// List the trash, show retention stats, or empty it
    Trash(TrashCmd),
    /// Purge trashed snippets past the retention window
    Clean(CleanArgs),
    /// Import a JSON backup, replacing the whole collection
    Import(ImportArgs),
    /// Export the collection as a JSON backup
    Export(ExportArgs),
    /// View or locate the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// View to list: all (default), pinned, or trash
    pub view: Option<String>,
    /// Filter the view by search text
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Snippet id (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search text (matches snippet text and keywords, case-insensitive)
    pub query: String,
    /// Restrict to a view: all (default), pinned, or trash
    #[arg(long)]
    pub view: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Snippet text
    pub text: String,
    /// Keyword tag (repeatable)
    #[arg(short = 'k', long = "keyword")]
    pub keyword: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Snippet id
    pub id: String,
    /// New snippet text
    #[arg(long)]
    pub text: Option<String>,
    /// Replacement keyword tag (repeatable; replaces all keywords)
    #[arg(short = 'k', long = "keyword")]
    pub keyword: Vec<String>,
}

#[derive(Args)]
pub struct IdArg {
    /// Snippet id
    pub id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Snippet ids to delete permanently
    #[arg(required = true)]
    pub ids: Vec<String>,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Trash management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TrashCmd {
    #[command(subcommand)]
    pub action: Option<TrashAction>,
}

#[derive(Subcommand)]
pub enum TrashAction {
    /// Show trash retention statistics
    Stats,
    /// Permanently delete everything in the trash
    Clear(TrashClearArgs),
}

#[derive(Args)]
pub struct TrashClearArgs {
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CleanArgs {
    /// Show what would be removed without making changes
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file to import
    pub file: String,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: snip-backup-<date>.json)
    pub file: Option<String>,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Print the absolute path to the recovery log
    Path,
}
