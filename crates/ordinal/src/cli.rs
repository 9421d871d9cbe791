//! Clap derive structures for the `ordinal` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use ordinal_core::{IpProtocol, LocalRouteFamily, RuleNumber};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ordinal -- reorder firewall and policy rules on a router console
#[derive(Debug, Parser)]
#[command(
    name = "ordinal",
    version,
    about = "Inspect and reorder ordered rule collections on a router console",
    long_about = "Lists and reorders firewall chains, local-route policies and \
        extended community lists.\n\n\
        Every reorder is sent to the console as one renumbering transaction.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Console profile to use
    #[arg(long, short = 'p', env = "ORDINAL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Console URL (overrides profile)
    #[arg(long, short = 'c', env = "ORDINAL_CONSOLE", global = true)]
    pub console: Option<String>,

    /// Console API key
    #[arg(long, env = "ORDINAL_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ORDINAL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ORDINAL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ORDINAL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Firewall chain rules (numbers are permuted on reorder)
    #[command(alias = "fw")]
    Firewall(FirewallArgs),

    /// Local-route policy rules (numbers are compacted on reorder)
    #[command(alias = "lr")]
    LocalRoute(LocalRouteArgs),

    /// Extended community list rules (numbers are compacted on reorder)
    #[command(alias = "ecl")]
    ExtCommunity(ExtCommunityArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Collection scopes ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FirewallArgs {
    /// Chain name
    #[arg(long)]
    pub chain: String,

    /// Address family
    #[arg(long, value_enum, default_value = "ipv4")]
    pub protocol: ProtocolArg,

    /// Address a user-defined chain rather than a built-in one
    #[arg(long)]
    pub custom: bool,

    #[command(subcommand)]
    pub action: RulesCommand,
}

#[derive(Debug, Args)]
pub struct LocalRouteArgs {
    /// Policy name
    #[arg(long)]
    pub policy: String,

    /// Address family
    #[arg(long, value_enum, default_value = "ipv4")]
    pub family: ProtocolArg,

    #[command(subcommand)]
    pub action: RulesCommand,
}

#[derive(Debug, Args)]
pub struct ExtCommunityArgs {
    /// List name
    #[arg(long)]
    pub list: String,

    #[command(subcommand)]
    pub action: RulesCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    Ipv4,
    Ipv6,
}

impl From<ProtocolArg> for IpProtocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Ipv4 => IpProtocol::Ipv4,
            ProtocolArg::Ipv6 => IpProtocol::Ipv6,
        }
    }
}

impl From<ProtocolArg> for LocalRouteFamily {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Ipv4 => LocalRouteFamily::Ipv4,
            ProtocolArg::Ipv6 => LocalRouteFamily::Ipv6,
        }
    }
}

// ── Rule actions (shared by every collection) ────────────────────────

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List rules in their current order
    #[command(alias = "ls")]
    List {
        /// Ask the console to re-read its configuration first
        #[arg(long)]
        refresh: bool,
    },

    /// Move one rule into the slot held by another
    #[command(alias = "mv")]
    Move {
        /// Number of the rule to move
        #[arg(long)]
        rule: RuleNumber,

        /// Number of the rule whose slot it takes
        #[arg(long)]
        to: RuleNumber,

        /// Print the renumbering transaction without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply a complete new order, given as current rule numbers
    Order {
        /// Every rule number of the collection, in the desired order
        #[arg(required = true, num_args = 1..)]
        numbers: Vec<RuleNumber>,

        /// Print the renumbering transaction without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// Keep listing the collection as the console reports changes
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (keys are redacted)
    Show,

    /// Print the config file path
    Path,

    /// Create or update a profile
    SetProfile {
        /// Profile name
        name: String,

        /// Console URL
        #[arg(long)]
        url: String,

        /// Environment variable holding the API key
        #[arg(long)]
        api_key_env: Option<String>,

        /// Accept self-signed certificates for this profile
        #[arg(long)]
        insecure: bool,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Store a profile's API key in the system keyring (read from stdin)
    SetKey {
        /// Profile name (defaults to the active profile)
        name: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
