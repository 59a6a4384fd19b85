use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{self, Write};

use serde::Serialize;

use crate::errors::GenerationError;
use crate::output::OutputFormat;

/// Destination for rendered lines addressed to a named channel.
///
/// A broker publisher would implement this; the generator itself only
/// produces the lines.
pub trait LineSink {
    fn send(&mut self, channel: &str, line: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes every line to an `io::Write`, ignoring the channel.
pub struct WriterSink<W: Write> {
    writer: W,
    sent: BTreeMap<String, u64>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            sent: BTreeMap::new(),
        }
    }

    /// Lines sent so far, per channel.
    pub fn sent(&self) -> &BTreeMap<String, u64> {
        &self.sent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn send(&mut self, channel: &str, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        *self.sent.entry(channel.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Render each item with `format` and send it to `channel`.
pub fn send_all<'a, S, T, I>(
    sink: &mut S,
    channel: &str,
    items: I,
    format: OutputFormat,
) -> Result<u64, GenerationError>
where
    S: LineSink + ?Sized,
    T: Display + Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sent = 0;
    for item in items {
        sink.send(channel, &format.render(item)?)?;
        sent += 1;
    }
    sink.flush()?;
    Ok(sent)
}
