//! Parallel generation driver.
//!
//! Base words are pulled from the source on the calling thread and cut into
//! shards of `batch_size` words. Each shard is spread over a rayon pool; a
//! worker applies every rule program to its word, filters the results and
//! claims them in the shared [`DedupSet`]. Newly unique candidates travel
//! over a bounded channel to a single writer thread that flushes them to
//! the sink in batches of at most `batch_size`.
//!
//! Workers block when the channel is full, so memory stays bounded by the
//! channel capacity plus one shard and one pending batch, whatever the
//! corpus size. No ordering is guaranteed across words or workers.

use std::io;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use cbwg_rules::apply;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, DEFAULT_BATCH_SIZE};
use crate::dedup::DedupSet;
use crate::error::{ConfigError, GenerateError, SourceError};
use crate::filter::CandidateFilter;
use crate::rules::RuleSet;
use crate::sink::CandidateSink;

/// Counters describing one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    /// Base words read (direct candidates received, for [`Generator::emit_direct`]).
    pub words: u64,
    /// Rule applications that produced a candidate.
    pub applied: u64,
    /// Rule applications rejected by the executor.
    pub rejected: u64,
    /// Candidates dropped by the filter.
    pub filtered: u64,
    /// Candidates dropped as already emitted.
    pub duplicates: u64,
    /// Candidates written to the sink.
    pub emitted: u64,
    /// Sink batches written.
    pub batches: u64,
}

#[derive(Debug, Default)]
struct Counters {
    words: AtomicU64,
    applied: AtomicU64,
    rejected: AtomicU64,
    filtered: AtomicU64,
    duplicates: AtomicU64,
    emitted: AtomicU64,
    batches: AtomicU64,
}

impl Counters {
    fn add(counter: &AtomicU64, n: u64) {
        if n > 0 {
            counter.fetch_add(n, Ordering::Relaxed);
        }
    }

    fn record(&self, tally: &Tally) {
        Self::add(&self.applied, tally.applied);
        Self::add(&self.rejected, tally.rejected);
        Self::add(&self.filtered, tally.filtered);
        Self::add(&self.duplicates, tally.duplicates);
    }

    fn snapshot(&self) -> GenerationStats {
        GenerationStats {
            words: self.words.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
        }
    }
}

/// Per-word counts, folded into [`Counters`] once per word.
#[derive(Debug, Default)]
struct Tally {
    applied: u64,
    rejected: u64,
    filtered: u64,
    duplicates: u64,
}

/// Why the word feed stopped early.
enum Stop {
    Source(SourceError),
    WriterGone,
}

/// Runs rule programs over base words and streams unique, accepted
/// candidates to a sink.
#[derive(Debug)]
pub struct Generator {
    rules: RuleSet,
    filter: CandidateFilter,
    batch_size: usize,
    workers: usize,
    verbose: bool,
}

impl Generator {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn new(
        rules: RuleSet,
        filter: CandidateFilter,
        config: &EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let workers = config.workers.unwrap_or_else(|| {
            thread::available_parallelism().map_or(1, NonZeroUsize::get)
        });
        Ok(Self {
            rules,
            filter,
            batch_size: config.batch_size,
            workers,
            verbose: config.verbose_logging,
        })
    }

    /// Worker threads used by [`Generator::run`].
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Apply every rule to every word and write the unique accepted
    /// candidates to `sink`.
    ///
    /// # Errors
    ///
    /// [`GenerateError::Source`] carries the first word source failure
    /// unchanged. [`GenerateError::Sink`] stops the run on a write failure.
    /// [`GenerateError::WorkerPool`] if the pool cannot start. Candidates
    /// already flushed before a failure stay written.
    pub fn run<I, S>(&self, words: I, mut sink: S) -> Result<GenerationStats, GenerateError>
    where
        I: IntoIterator<Item = Result<String, SourceError>>,
        S: CandidateSink,
    {
        if self.rules.is_empty() {
            warn!("rule set is empty, nothing will be generated");
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("cbwg-worker-{i}"))
            .build()?;
        let dedup = DedupSet::new();
        let counters = Counters::default();
        let (tx, rx) = mpsc::sync_channel::<Vec<String>>(self.workers.saturating_mul(2).max(1));

        info!(
            rules = self.rules.len(),
            workers = self.workers,
            batch_size = self.batch_size,
            "generation started"
        );

        let (fed, written) = thread::scope(|scope| {
            let writer = scope.spawn(|| drain(rx, &mut sink, self.batch_size, &counters));
            let fed = self.feed(words, &pool, &dedup, &counters, tx);
            let written = writer
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (fed, written)
        });

        written.map_err(GenerateError::Sink)?;
        match fed {
            Ok(()) => {}
            Err(Stop::Source(err)) => return Err(err.into()),
            // The writer only hangs up after a sink error, handled above.
            Err(Stop::WriterGone) => {
                return Err(GenerateError::Sink(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "candidate writer stopped",
                )))
            }
        }

        let stats = counters.snapshot();
        info!(?stats, "generation finished");
        Ok(stats)
    }

    /// [`Generator::run`] over a word source that cannot fail.
    ///
    /// # Errors
    ///
    /// See [`Generator::run`].
    pub fn generate<I, S>(&self, words: I, sink: S) -> Result<GenerationStats, GenerateError>
    where
        I: IntoIterator<Item = String>,
        S: CandidateSink,
    {
        self.run(words.into_iter().map(Ok), sink)
    }

    /// Filter, deduplicate and write ready-made candidates, bypassing the
    /// rule engine. Used for wordlists produced outside cbwg.
    ///
    /// # Errors
    ///
    /// [`GenerateError::Sink`] on a write failure.
    pub fn emit_direct<I, S>(&self, candidates: I, sink: S) -> Result<GenerationStats, GenerateError>
    where
        I: IntoIterator<Item = String>,
        S: CandidateSink,
    {
        let dedup = DedupSet::new();
        let counters = Counters::default();
        let mut batches = BatchWriter::new(sink, self.batch_size, &counters);
        let mut tally = Tally::default();
        for candidate in candidates {
            Counters::add(&counters.words, 1);
            if let Some(candidate) = self.admit(candidate, &dedup, &mut tally) {
                batches.push(candidate).map_err(GenerateError::Sink)?;
            }
        }
        batches.finish().map_err(GenerateError::Sink)?;
        counters.record(&tally);

        let stats = counters.snapshot();
        info!(?stats, "direct emission finished");
        Ok(stats)
    }

    /// Read shards from `words` and fan each one out over the pool.
    fn feed<I>(
        &self,
        words: I,
        pool: &ThreadPool,
        dedup: &DedupSet,
        counters: &Counters,
        tx: SyncSender<Vec<String>>,
    ) -> Result<(), Stop>
    where
        I: IntoIterator<Item = Result<String, SourceError>>,
    {
        let mut words = words.into_iter();
        let mut shard: Vec<String> = Vec::with_capacity(self.batch_size.min(DEFAULT_BATCH_SIZE));
        let mut shard_index: u64 = 0;

        loop {
            shard.clear();
            let mut failure = None;
            for word in words.by_ref() {
                match word {
                    Ok(word) => shard.push(word),
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
                if shard.len() >= self.batch_size {
                    break;
                }
            }
            if shard.is_empty() {
                return failure.map_or(Ok(()), |err| Err(Stop::Source(err)));
            }

            pool.install(|| {
                shard.par_iter().try_for_each_with(tx.clone(), |tx, word| {
                    let candidates = self.expand(word, dedup, counters);
                    if candidates.is_empty() {
                        return Ok(());
                    }
                    tx.send(candidates).map_err(|_| Stop::WriterGone)
                })
            })?;

            Counters::add(&counters.words, shard.len() as u64);
            shard_index = shard_index.saturating_add(1);
            if self.verbose {
                info!(shard = shard_index, words = shard.len(), "shard done");
            } else {
                debug!(shard = shard_index, words = shard.len(), "shard done");
            }
            // Words read before a source failure are still expanded.
            if let Some(err) = failure {
                return Err(Stop::Source(err));
            }
        }
    }

    /// Every unique accepted candidate `word` yields, in rule order.
    fn expand(&self, word: &str, dedup: &DedupSet, counters: &Counters) -> Vec<String> {
        let mut tally = Tally::default();
        let mut out = Vec::new();
        for program in self.rules.programs() {
            let Some(candidate) = apply(program, word) else {
                tally.rejected = tally.rejected.saturating_add(1);
                continue;
            };
            tally.applied = tally.applied.saturating_add(1);
            if let Some(candidate) = self.admit(candidate, dedup, &mut tally) {
                out.push(candidate);
            }
        }
        counters.record(&tally);
        out
    }

    /// Run `candidate` through the filter and the dedup set.
    fn admit(&self, candidate: String, dedup: &DedupSet, tally: &mut Tally) -> Option<String> {
        if !self.filter.accept(&candidate) {
            tally.filtered = tally.filtered.saturating_add(1);
            return None;
        }
        if !dedup.insert(&candidate) {
            tally.duplicates = tally.duplicates.saturating_add(1);
            return None;
        }
        Some(candidate)
    }
}

/// Writer thread body: regroup per-word candidate lists into sink batches.
///
/// Returning drops `rx`, which makes every pending and future send fail.
fn drain<S: CandidateSink>(
    rx: Receiver<Vec<String>>,
    sink: S,
    batch_size: usize,
    counters: &Counters,
) -> io::Result<()> {
    let mut batches = BatchWriter::new(sink, batch_size, counters);
    for candidates in rx {
        for candidate in candidates {
            batches.push(candidate)?;
        }
    }
    batches.finish()
}

/// Accumulates candidates and writes them in batches of `batch_size`.
struct BatchWriter<'a, S> {
    sink: S,
    pending: Vec<String>,
    batch_size: usize,
    counters: &'a Counters,
}

impl<'a, S: CandidateSink> BatchWriter<'a, S> {
    fn new(sink: S, batch_size: usize, counters: &'a Counters) -> Self {
        Self {
            sink,
            pending: Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE)),
            batch_size,
            counters,
        }
    }

    fn push(&mut self, candidate: String) -> io::Result<()> {
        self.pending.push(candidate);
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.sink.write_batch(&self.pending)?;
        Counters::add(&self.counters.emitted, self.pending.len() as u64);
        Counters::add(&self.counters.batches, 1);
        self.pending.clear();
        Ok(())
    }

    fn finish(mut self) -> io::Result<()> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::config::FilterConfig;

    fn generator(rules: &[&str], filter: FilterConfig, batch_size: usize) -> Generator {
        let rules = RuleSet::from_lines("<test>", rules).unwrap();
        let filter = CandidateFilter::new(&filter).unwrap();
        let config = EngineConfig {
            batch_size,
            workers: Some(2),
            ..EngineConfig::default()
        };
        Generator::new(rules, filter, &config).unwrap()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn expands_every_rule_over_every_word() {
        let g = generator(&["l", "u", "c", "$1"], FilterConfig::default(), 100);
        let mut out = Vec::new();
        let stats = g.generate(words(&["Password"]), &mut out).unwrap();
        let got: HashSet<_> = out.into_iter().collect();
        let want: HashSet<String> = words(&["password", "PASSWORD", "Password", "Password1"])
            .into_iter()
            .collect();
        assert_eq!(got, want);
        assert_eq!(stats.words, 1);
        assert_eq!(stats.applied, 4);
        assert_eq!(stats.emitted, 4);
    }

    #[test]
    fn rejected_rules_are_counted_not_emitted() {
        let g = generator(&["$1", "D0"], FilterConfig::default(), 100);
        let mut out = Vec::new();
        let stats = g.generate(words(&[""]), &mut out).unwrap();
        assert_eq!(out, vec!["1"]);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn duplicates_across_words_emitted_once() {
        let g = generator(&["l"], FilterConfig::default(), 2);
        let mut out = Vec::new();
        let stats = g
            .generate(words(&["Admin", "ADMIN", "admin", "root"]), &mut out)
            .unwrap();
        out.sort();
        assert_eq!(out, vec!["admin", "root"]);
        assert_eq!(stats.duplicates, 2);
    }

    fn failing_feed() -> Vec<Result<String, SourceError>> {
        vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
            Err(SourceError {
                origin: "words.txt".into(),
                line: Some(3),
                source: io::Error::new(io::ErrorKind::InvalidData, "bad bytes"),
            }),
            Ok("never".to_string()),
        ]
    }

    #[test]
    fn source_error_propagates() {
        let g = generator(&[":"], FilterConfig::default(), 1);
        let mut out = Vec::new();
        let err = g.run(failing_feed(), &mut out).unwrap_err();
        assert!(matches!(err, GenerateError::Source(SourceError { line: Some(3), .. })));
        assert_eq!(out, vec!["first", "second"]);
    }

    #[test]
    fn words_before_a_source_error_are_written_whatever_the_batch_size() {
        for batch_size in [1, 2, 3, 100] {
            let g = generator(&[":"], FilterConfig::default(), batch_size);
            let mut out = Vec::new();
            let err = g.run(failing_feed(), &mut out).unwrap_err();
            assert!(matches!(err, GenerateError::Source(_)));
            out.sort();
            assert_eq!(out, vec!["first", "second"], "batch_size {batch_size}");
        }
    }

    #[test]
    fn huge_batch_size_does_not_preallocate() {
        let g = generator(&["$1"], FilterConfig::default(), usize::MAX / 2);
        let mut out = Vec::new();
        let stats = g.generate(words(&["a", "b"]), &mut out).unwrap();
        out.sort();
        assert_eq!(out, vec!["a1", "b1"]);
        assert_eq!(stats.batches, 1);
    }

    #[test]
    fn workers_default_to_available_parallelism() {
        let rules = RuleSet::from_lines("<test>", &[":"]).unwrap();
        let g = Generator::new(rules, CandidateFilter::default(), &EngineConfig::default()).unwrap();
        let expected = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        assert_eq!(g.workers(), expected);
        assert_eq!(generator(&[":"], FilterConfig::default(), 1).workers(), 2);
    }

    #[test]
    fn emit_direct_filters_and_dedups() {
        let filter = FilterConfig {
            min_length: Some(4),
            ..FilterConfig::default()
        };
        let g = generator(&[":"], filter, 2);
        let mut out = Vec::new();
        let stats = g
            .emit_direct(words(&["acme2024", "abc", "acme2024", "Acme!"]), &mut out)
            .unwrap();
        assert_eq!(out, vec!["acme2024", "Acme!"]);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.batches, 1);
    }

    #[test]
    fn batch_writer_respects_batch_size() {
        struct Recorder(Vec<usize>);
        impl CandidateSink for Recorder {
            fn write_batch(&mut self, batch: &[String]) -> io::Result<()> {
                self.0.push(batch.len());
                Ok(())
            }
        }

        let counters = Counters::default();
        let mut recorder = Recorder(Vec::new());
        let mut writer = BatchWriter::new(&mut recorder, 3, &counters);
        for i in 0..7 {
            writer.push(i.to_string()).unwrap();
        }
        writer.finish().unwrap();
        assert_eq!(recorder.0, vec![3, 3, 1]);
        assert_eq!(counters.snapshot().emitted, 7);
    }
}
