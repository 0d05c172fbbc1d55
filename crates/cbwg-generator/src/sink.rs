//! Output sinks for accepted candidates.

use std::io::{self, BufWriter, Write};

/// Append-only destination for candidates, written in flush batches.
///
/// A run hands batches to exactly one sink from a single writer thread.
pub trait CandidateSink: Send {
    /// Append `batch` and make it durable to the extent the sink supports.
    ///
    /// # Errors
    ///
    /// Any error stops the run.
    fn write_batch(&mut self, batch: &[String]) -> io::Result<()>;
}

/// Writes one candidate per line and flushes after every batch.
#[derive(Debug)]
pub struct LineSink<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns the error of the final flush.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(io::IntoInnerError::into_error)
    }
}

impl<W: Write + Send> CandidateSink for LineSink<W> {
    fn write_batch(&mut self, batch: &[String]) -> io::Result<()> {
        for candidate in batch {
            self.writer.write_all(candidate.as_bytes())?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }
}

/// Collects candidates in memory.
impl CandidateSink for Vec<String> {
    fn write_batch(&mut self, batch: &[String]) -> io::Result<()> {
        self.extend_from_slice(batch);
        Ok(())
    }
}

impl<S: CandidateSink + ?Sized> CandidateSink for &mut S {
    fn write_batch(&mut self, batch: &[String]) -> io::Result<()> {
        (**self).write_batch(batch)
    }
}

impl<S: CandidateSink + ?Sized> CandidateSink for Box<S> {
    fn write_batch(&mut self, batch: &[String]) -> io::Result<()> {
        (**self).write_batch(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_sink_writes_one_candidate_per_line() {
        let mut sink = LineSink::new(Vec::new());
        sink.write_batch(&["password".to_string(), "Password1".to_string()])
            .unwrap();
        sink.write_batch(&["p@ss".to_string()]).unwrap();
        let bytes = sink.into_inner().unwrap();
        assert_eq!(bytes, b"password\nPassword1\np@ss\n");
    }

    #[test]
    fn vec_sink_collects() {
        let mut out: Vec<String> = Vec::new();
        out.write_batch(&["a".to_string()]).unwrap();
        out.write_batch(&["b".to_string()]).unwrap();
        assert_eq!(out, vec!["a", "b"]);
    }
}
