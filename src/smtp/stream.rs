use std::io::{self, Read, Write};

use super::SmtpReply;
use crate::error::SmtpFailure;

/// Longest reply line accepted, CRLF included.
const MAX_LINE: usize = 1000;

/// Line-oriented command/reply framing over any byte stream.
#[derive(Debug)]
pub(crate) struct SmtpStream<S> {
    inner: S,
    buffer: Vec<u8>,
}

impl<S: Read + Write> SmtpStream<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    pub(crate) fn send_command(&mut self, command: &str) -> io::Result<()> {
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.inner.write_all(&data)?;
        self.inner.flush()
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, SmtpFailure> {
        let mut lines = Vec::new();
        let mut code: Option<u16> = None;
        loop {
            let line = self.read_line()?;
            let code_part = line
                .get(..3)
                .ok_or_else(|| SmtpFailure::protocol(format!("invalid reply: {line:?}")))?;
            let parsed_code = code_part
                .parse::<u16>()
                .map_err(|_| SmtpFailure::protocol(format!("invalid code in line: {line:?}")))?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(SmtpFailure::protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }
            let continuation = line.as_bytes().get(3) == Some(&b'-');
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if !continuation {
                return Ok(SmtpReply {
                    code: parsed_code,
                    message: lines.join("\n"),
                });
            }
        }
    }

    fn read_line(&mut self) -> Result<String, SmtpFailure> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return String::from_utf8(line)
                    .map_err(|err| SmtpFailure::protocol(format!("utf8 error: {err}")));
            }
            if self.buffer.len() >= MAX_LINE {
                return Err(SmtpFailure::protocol(format!(
                    "reply line exceeds {MAX_LINE} bytes"
                )));
            }

            let mut buf = [0u8; 512];
            let read = self.inner.read(&mut buf)?;
            if read == 0 {
                return Err(SmtpFailure::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                )));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }

    #[cfg(test)]
    pub(crate) fn get_ref(&self) -> &S {
        &self.inner
    }
}
