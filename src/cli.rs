use clap::Parser;

use crate::types::LogLevel;

#[derive(Parser)]
#[command(
    name = "vimeo-extract",
    version,
    about = "Pull every video on a Vimeo account and emit VidApp catalog records"
)]
pub struct Cli {
    /// Vimeo personal access token
    #[arg(long, env = "VIMEO_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Log level (RUST_LOG overrides this when set)
    #[arg(long, env = "LOG_LEVEL", value_enum, ignore_case = true, default_value = "debug")]
    pub log_level: LogLevel,

    /// Only include videos modified after this time
    /// (e.g. 2024-01-02T15:04:05+00:00, 2024-01-02, or 20d)
    #[arg(long)]
    pub modified_since: Option<String>,

    /// VidApp application id stamped on every record
    #[arg(long)]
    pub app_id: Option<String>,

    /// JSON file with the invocation request ({"modified_since": ..., "app_id": ...}).
    /// Flags take precedence over fields set in the file.
    #[arg(long)]
    pub event: Option<String>,

    /// Vimeo API base URL
    #[arg(long, default_value = "https://api.vimeo.com")]
    pub api_base: String,

    /// Throttled responses tolerated across the whole pull before giving up
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Write the JSON result here instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<String>,
}
