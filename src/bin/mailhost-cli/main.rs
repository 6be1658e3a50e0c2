mod args;
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use mailhost_lib::Validator;

use crate::args::{Cli, Commands, OutputFormat};
use crate::output::CheckRow;

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "with-tracing")]
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mailhost_lib=debug")),
            )
            .init();
    }

    let format = OutputFormat::parse(&cli.format)?;

    let mut emails = Vec::new();
    if cli.stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let email = line.trim();
            if !email.is_empty() {
                emails.push(email.to_string());
            }
        }
    } else if let Some(Commands::Check { email }) = &cli.cmd {
        emails.push(email.clone());
    } else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    }

    let validator =
        Validator::system(cli.probe_options()).context("initialise system DNS resolver")?;
    let rows: Vec<CheckRow> = emails
        .iter()
        .map(|email| CheckRow::from_outcome(email, &validator.validate_host(email)))
        .collect();

    output::render(&rows, format, cli.out.as_deref())?;

    // exit codes: 0 all accepted, 2 some rejected, 1 fatal
    if rows.iter().any(|row| !row.accepted) {
        std::process::exit(2);
    }
    Ok(())
}
