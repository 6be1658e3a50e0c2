use anyhow::Result;
use mailhost_lib::{SmtpReply, Stage, ValidationOutcome, domain_of};

use crate::args::OutputFormat;

/// One line of the report: the address and how its probe ended.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct CheckRow {
    pub email: String,
    pub domain: String,
    pub accepted: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub stage: Option<Stage>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub code: Option<u16>,
    /// `true` for a 4xx reply worth retrying later, `false` for a 5xx one.
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub transient: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl CheckRow {
    pub fn from_outcome(email: &str, outcome: &ValidationOutcome) -> Self {
        let (stage, reply, error) = match outcome {
            Ok(()) => (None, None, None),
            Err(err) => (Some(err.stage()), err.reply(), Some(err.to_string())),
        };
        Self {
            email: email.to_string(),
            domain: domain_of(email).to_string(),
            accepted: outcome.is_ok(),
            stage,
            code: reply.map(|reply| reply.code),
            transient: reply.and_then(failure_class),
            error,
        }
    }
}

fn failure_class(reply: &SmtpReply) -> Option<bool> {
    if reply.is_transient_failure() {
        Some(true)
    } else if reply.is_permanent_failure() {
        Some(false)
    } else {
        None
    }
}

pub fn render(rows: &[CheckRow], format: OutputFormat, out: Option<&str>) -> Result<()> {
    match format {
        OutputFormat::Human => human(rows, out),
        OutputFormat::Json => json(rows, out),
        OutputFormat::Ndjson => ndjson(rows, out),
        OutputFormat::Csv => csv_report(rows, out),
    }
}

fn human(rows: &[CheckRow], out: Option<&str>) -> Result<()> {
    let mut report = String::new();
    for row in rows {
        report.push_str(&human_line(row));
        report.push('\n');
    }
    match out {
        Some(path) => write_all_atomically(path, report.as_bytes()),
        None => {
            print!("{report}");
            Ok(())
        }
    }
}

fn human_line(row: &CheckRow) -> String {
    match (&row.stage, &row.error) {
        (Some(stage), Some(error)) if row.transient == Some(true) => {
            format!("[RETRY]    {} :: {stage}: {error}", row.email)
        }
        (Some(stage), Some(error)) => format!("[REJECTED] {} :: {stage}: {error}", row.email),
        _ => format!("[OK]       {}", row.email),
    }
}

#[cfg(feature = "with-serde")]
fn json(rows: &[CheckRow], out: Option<&str>) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    match out {
        Some(path) => write_all_atomically(path, s.as_bytes()),
        None => {
            println!("{s}");
            Ok(())
        }
    }
}

#[cfg(not(feature = "with-serde"))]
fn json(_rows: &[CheckRow], _out: Option<&str>) -> Result<()> {
    anyhow::bail!("format=json requires the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn ndjson(rows: &[CheckRow], out: Option<&str>) -> Result<()> {
    let mut buf = Vec::new();
    for row in rows {
        buf.extend_from_slice(serde_json::to_string(row)?.as_bytes());
        buf.push(b'\n');
    }
    match out {
        Some(path) => write_all_atomically(path, &buf),
        None => {
            print!("{}", String::from_utf8_lossy(&buf));
            Ok(())
        }
    }
}

#[cfg(not(feature = "with-serde"))]
fn ndjson(_rows: &[CheckRow], _out: Option<&str>) -> Result<()> {
    anyhow::bail!("format=ndjson requires the 'with-serde' feature")
}

#[cfg(feature = "with-csv")]
fn csv_report(rows: &[CheckRow], out: Option<&str>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "email",
        "domain",
        "accepted",
        "stage",
        "code",
        "transient",
        "error",
    ])?;
    for row in rows {
        let code = row.code.map(|code| code.to_string()).unwrap_or_default();
        let transient = row.transient.map(|t| t.to_string()).unwrap_or_default();
        wtr.write_record([
            row.email.as_str(),
            row.domain.as_str(),
            if row.accepted { "true" } else { "false" },
            row.stage.map(Stage::as_str).unwrap_or(""),
            code.as_str(),
            transient.as_str(),
            row.error.as_deref().unwrap_or(""),
        ])?;
    }
    let data = wtr.into_inner()?;
    match out {
        Some(path) => write_all_atomically(path, &data),
        None => {
            print!("{}", String::from_utf8_lossy(&data));
            Ok(())
        }
    }
}

#[cfg(not(feature = "with-csv"))]
fn csv_report(_rows: &[CheckRow], _out: Option<&str>) -> Result<()> {
    anyhow::bail!("format=csv requires the 'with-csv' feature")
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;
    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailhost_lib::{SmtpReply, ValidationError};

    #[test]
    fn accepted_row_has_no_failure_fields() {
        let row = CheckRow::from_outcome("mail@company.com", &Ok(()));
        assert!(row.accepted);
        assert_eq!(row.domain, "company.com");
        assert_eq!(human_line(&row), "[OK]       mail@company.com");
    }

    #[test]
    fn rejected_row_carries_stage_and_code() {
        let outcome = Err(ValidationError::recipient_rejected(SmtpReply::new(
            550,
            "5.1.1 User unknown",
        )));
        let row = CheckRow::from_outcome("nobody@company.com", &outcome);
        assert!(!row.accepted);
        assert_eq!(row.stage, Some(Stage::Recipient));
        assert_eq!(row.code, Some(550));
        assert_eq!(row.transient, Some(false));
        assert_eq!(
            human_line(&row),
            "[REJECTED] nobody@company.com :: recipient: recipient rejected: server replied 550 5.1.1 User unknown"
        );
    }

    #[test]
    fn greylisted_row_is_marked_for_retry() {
        let outcome = Err(ValidationError::sender_rejected(SmtpReply::new(
            451,
            "4.7.1 try again later",
        )));
        let row = CheckRow::from_outcome("later@company.com", &outcome);
        assert_eq!(row.stage, Some(Stage::Sender));
        assert_eq!(row.transient, Some(true));
        assert!(human_line(&row).starts_with("[RETRY]    later@company.com :: sender:"));
    }

    #[test]
    fn failure_without_reply_has_no_class() {
        let outcome = Err(ValidationError::close(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        )));
        let row = CheckRow::from_outcome("mail@company.com", &outcome);
        assert_eq!(row.stage, Some(Stage::Close));
        assert_eq!(row.code, None);
        assert_eq!(row.transient, None);
    }

    #[test]
    fn human_report_is_written_to_out_file() {
        let path = std::env::temp_dir().join(format!("mailhost-cli-human-{}.txt", std::process::id()));
        let path = path.to_str().expect("utf8 temp path").to_string();
        let rows = [
            CheckRow::from_outcome("mail@company.com", &Ok(())),
            CheckRow::from_outcome(
                "nobody@company.com",
                &Err(ValidationError::recipient_rejected(SmtpReply::new(550, "no such user"))),
            ),
        ];

        render(&rows, OutputFormat::Human, Some(&path)).expect("report written");
        let written = std::fs::read_to_string(&path).expect("read report");
        std::fs::remove_file(&path).ok();

        assert_eq!(
            written,
            "[OK]       mail@company.com\n\
             [REJECTED] nobody@company.com :: recipient: recipient rejected: server replied 550 no such user\n"
        );
        assert!(!std::path::Path::new(&format!("{path}.tmp")).exists());
    }
}
