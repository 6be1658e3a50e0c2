use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use mailhost_lib::{DEFAULT_HELO_NAME, DEFAULT_MAIL_FROM, ProbeOptions, SMTP_PORT};

#[derive(Parser)]
#[command(
    name = "mailhost-cli",
    version,
    about = "Asks the mail exchanger of an address whether it would accept mail for it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file instead of stdout, in the chosen --format
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// name announced with EHLO/HELO
    #[arg(long, default_value = DEFAULT_HELO_NAME)]
    pub helo: String,

    /// envelope sender used for MAIL FROM
    #[arg(long = "from", default_value = DEFAULT_MAIL_FROM)]
    pub mail_from: String,

    /// SMTP port on the mail exchanger
    #[arg(long, default_value_t = SMTP_PORT)]
    pub port: u16,

    /// TCP connect timeout in ms (0 disables)
    #[arg(long = "connect-timeout-ms", default_value_t = 10_000)]
    pub connect_timeout_ms: u64,

    /// per-command read/write timeout in ms (0 disables)
    #[arg(long = "command-timeout-ms", default_value_t = 10_000)]
    pub command_timeout_ms: u64,

    /// log probe steps to stderr (feature `with-tracing`)
    #[cfg(feature = "with-tracing")]
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// probe a single address
    Check { email: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            helo_name: self.helo.clone(),
            mail_from: self.mail_from.clone(),
            port: self.port,
            connect_timeout_ms: self.connect_timeout_ms,
            command_timeout_ms: self.command_timeout_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Ndjson,
    Csv,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            "csv" => Ok(Self::Csv),
            other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
        }
    }
}
