use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "edgelimit")]
#[command(about = "Manage rate-limit rules on EdgeShield zones")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Zone name the command operates on
    #[arg(long, global = true)]
    pub zone: Option<String>,

    /// Override RUST_LOG level (e.g., info, debug)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all rate-limit rules in the zone
    List(ListArgs),
    /// Show a single rule
    Describe(DescribeArgs),
    /// Create a new rule
    Create(CreateArgs),
    /// Reconcile a rule against desired state; update only if it drifted
    Update(UpdateArgs),
    /// Delete a rule
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Print the raw JSON documents instead of a table
    #[arg(long = "json-output")]
    pub json_output: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// Rule identifier
    #[arg(long)]
    pub id: String,

    /// Print the raw JSON document instead of a table
    #[arg(long = "json-output")]
    pub json_output: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub rule: RuleFlags,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Rule identifier
    #[arg(long)]
    pub id: String,

    #[command(flatten)]
    pub rule: RuleFlags,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Rule identifier
    #[arg(long)]
    pub id: String,
}

/// Inline flags describing the desired rule. All of them are ignored when
/// `--stdin` is set. Flags left out fall through to zero values; see
/// `input::rule_from_flags` for the consequences.
#[derive(Args)]
pub struct RuleFlags {
    /// Read the full rule as JSON from stdin instead of flags
    #[arg(long)]
    pub stdin: bool,

    /// Free-text description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Create the rule in a disabled state
    #[arg(long)]
    pub disabled: bool,

    /// HTTP methods to match (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub methods: Vec<String>,

    /// URL schemes to match (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub schemes: Vec<String>,

    /// URL pattern to match
    #[arg(long, default_value = "")]
    pub url: String,

    /// Response statuses to match (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<u16>,

    /// Action mode once the threshold trips (e.g. simulate, ban, challenge)
    #[arg(long, default_value = "")]
    pub action: String,

    /// How long the action stays applied, in seconds
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,

    /// Content type of the custom action response
    #[arg(long, default_value = "")]
    pub response_content_type: String,

    /// Body of the custom action response
    #[arg(long, default_value = "")]
    pub response_body: String,

    /// Requests per period that trip the rule
    #[arg(long, default_value_t = 0)]
    pub threshold: u64,

    /// Sampling period in seconds
    #[arg(long, default_value_t = 0)]
    pub period: u64,
}

pub fn init_logging(level: Option<&str>) {
    // Respect explicit level, else default to info, allow env override via RUST_LOG
    if let Some(lvl) = level {
        std::env::set_var("RUST_LOG", lvl);
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
