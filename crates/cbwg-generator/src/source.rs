//! Base word source backed by seed corpus files.
//!
//! Files are read lazily, one line at a time, so memory use does not grow
//! with corpus size.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::{Encoding, SourceConfig};
use crate::error::{ConfigError, SourceError};

/// One or more seed files, read in order.
#[derive(Debug, Clone)]
pub struct FileSource {
    paths: Vec<PathBuf>,
    config: SourceConfig,
}

impl FileSource {
    /// Every path must already name a regular file, so a bad seed path
    /// fails here rather than partway through a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroChunkSize`] for an unusable read buffer
    /// and [`ConfigError::Seed`] for a missing path or a non-file.
    pub fn new(paths: Vec<PathBuf>, config: SourceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        for path in &paths {
            check_seed_file(path)?;
        }
        Ok(Self { paths, config })
    }

    /// Iterate over the base words of every file.
    ///
    /// The first read or decode failure is yielded as an error and ends the
    /// iteration.
    #[must_use]
    pub fn words(&self) -> Words {
        Words {
            pending: self.paths.clone().into_iter(),
            current: None,
            config: self.config.clone(),
            buf: Vec::new(),
            failed: false,
        }
    }
}

impl IntoIterator for &FileSource {
    type Item = Result<String, SourceError>;
    type IntoIter = Words;

    fn into_iter(self) -> Words {
        self.words()
    }
}

/// Iterator over the base words of a [`FileSource`].
#[derive(Debug)]
pub struct Words {
    pending: std::vec::IntoIter<PathBuf>,
    current: Option<OpenFile>,
    config: SourceConfig,
    buf: Vec<u8>,
    failed: bool,
}

#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    reader: BufReader<File>,
    line: u64,
}

impl Words {
    fn open(&self, path: PathBuf) -> Result<OpenFile, SourceError> {
        match File::open(&path) {
            Ok(file) => Ok(OpenFile {
                reader: BufReader::with_capacity(self.config.chunk_size, file),
                path,
                line: 0,
            }),
            Err(source) => Err(SourceError {
                origin: path,
                line: None,
                source,
            }),
        }
    }

    fn fail(&mut self, err: SourceError) -> Option<Result<String, SourceError>> {
        self.failed = true;
        self.current = None;
        Some(Err(err))
    }
}

impl Iterator for Words {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            let Some(file) = self.current.as_mut() else {
                let path = self.pending.next()?;
                match self.open(path) {
                    Ok(file) => self.current = Some(file),
                    Err(err) => return self.fail(err),
                }
                continue;
            };

            self.buf.clear();
            match file.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.current = None;
                    continue;
                }
                Ok(_) => file.line = file.line.saturating_add(1),
                Err(source) => {
                    let err = SourceError {
                        origin: file.path.clone(),
                        line: Some(file.line.saturating_add(1)),
                        source,
                    };
                    return self.fail(err);
                }
            }

            match decode(&self.buf, &self.config) {
                Ok(text) => {
                    let word = text.trim();
                    if word.is_empty() && self.config.skip_blank_lines {
                        continue;
                    }
                    return Some(Ok(word.to_owned()));
                }
                Err(source) => {
                    let err = SourceError {
                        origin: file.path.clone(),
                        line: Some(file.line),
                        source,
                    };
                    return self.fail(err);
                }
            }
        }
    }
}

fn check_seed_file(path: &Path) -> Result<(), ConfigError> {
    let metadata = fs::metadata(path).map_err(|source| ConfigError::Seed {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.is_file() {
        Ok(())
    } else {
        Err(ConfigError::Seed {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        })
    }
}

/// Decode one raw line according to the configured encoding.
fn decode(bytes: &[u8], config: &SourceConfig) -> io::Result<String> {
    match config.encoding {
        Encoding::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
        Encoding::Utf8 if config.binary_mode => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Encoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err)),
    }
}

/// Convenience for a single seed file with default settings.
///
/// # Errors
///
/// See [`FileSource::new`].
pub fn read_words(path: &Path) -> Result<FileSource, ConfigError> {
    FileSource::new(vec![path.to_path_buf()], SourceConfig::default())
}
