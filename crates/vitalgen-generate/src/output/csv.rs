use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::record::Publication;

/// Write publications as headerless comma-separated lines in catalog order.
pub fn write_publications_csv(path: &Path, publications: &[Publication]) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(counting);

    for publication in publications {
        writer.write_record(publication.to_record())?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

pub(crate) struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    pub(crate) fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vitalgen_core::{Domain, Field, FieldCatalog};

    use super::*;
    use crate::record::RecordGenerator;

    #[test]
    fn file_lines_match_display() {
        let catalog = FieldCatalog::new(vec![
            Field::new(
                "patient-name",
                Domain::Choice {
                    values: vec!["Lovelace, Ada".to_string(), "Alan Turing".to_string()],
                },
            ),
            Field::new("heart-rate", Domain::IntRange { min: 50, max: 180 }),
        ])
        .expect("valid catalog");
        let generator = RecordGenerator::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let publications: Vec<Publication> =
            (0..20).map(|_| generator.sample_record(&mut rng)).collect();

        let path = std::env::temp_dir().join(format!(
            "vitalgen_publications_{}.csv",
            uuid::Uuid::new_v4()
        ));
        let bytes = write_publications_csv(&path, &publications).expect("write csv");
        let contents = std::fs::read_to_string(&path).expect("read csv");
        std::fs::remove_file(&path).expect("remove csv");

        assert_eq!(bytes, contents.len() as u64);
        let expected: Vec<String> = publications.iter().map(ToString::to_string).collect();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, expected);
    }
}
