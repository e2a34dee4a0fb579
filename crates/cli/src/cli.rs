use clap::{Args, Parser, Subcommand};

/// Tandem: chat completions from a local runtime or a remote peer.
#[derive(Debug, Parser)]
#[command(name = "tandem", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a single prompt and print the reply.
    Ask(AskArgs),
    /// List the built-in agent profiles.
    Agents,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// The prompt to send.
    pub prompt: String,

    /// Agent profile to use.
    #[arg(long)]
    pub agent: Option<String>,

    /// Requested verbosity level (0–5; out-of-range values are clamped).
    #[arg(long, short = 'v')]
    pub verbosity: Option<i64>,

    /// Local model override (e.g. "qwen2.5:14b").
    #[arg(long)]
    pub model: Option<String>,

    /// Force local execution even when a remote is configured.
    #[arg(long)]
    pub local: bool,

    /// Remote peer base URL (overrides TANDEM_REMOTE_URL).
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Demand remote execution; never fall back to local.
    #[arg(long)]
    pub remote_only: bool,

    /// Stream tokens as they arrive (local runtime only).
    #[arg(long, conflicts_with = "json")]
    pub stream: bool,

    /// Output the full result as JSON instead of plain text.
    #[arg(long)]
    pub json: bool,
}
