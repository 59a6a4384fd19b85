use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;
use crate::output::csv::CountingWriter;
use crate::subscription::Subscription;

/// Line rendering used by sinks and the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Publications as `a,b,c`, subscriptions as `(f<op>v);(g<op>w)`.
    #[default]
    Text,
    /// One JSON document per line.
    Json,
}

impl OutputFormat {
    pub fn render<T: Display + Serialize>(self, item: &T) -> Result<String, GenerationError> {
        Ok(match self {
            OutputFormat::Text => item.to_string(),
            OutputFormat::Json => serde_json::to_string(item)?,
        })
    }
}

/// Write one subscription line per entry; empty subscriptions produce empty
/// lines so line numbers match slot indices.
pub fn write_subscriptions(
    path: &Path,
    subscriptions: &[Subscription],
) -> Result<u64, GenerationError> {
    let mut writer = CountingWriter::new(BufWriter::new(File::create(path)?));
    for subscription in subscriptions {
        writeln!(writer, "{subscription}")?;
    }
    writer.flush()?;
    Ok(writer.bytes_written())
}
