//! Rotated-file archival
//!
//! Once a project accumulates more rotated log files than its retention
//! policy allows, the oldest ones get compressed into the project's archive
//! directory and the plain `.log` file is removed. Selection (`count` vs
//! `age`) is pure and testable in isolation; the actual compression runs on
//! a bounded worker pool so a slow archive of one project never blocks
//! ingestion for another.

use crate::config::{ArchiveConfig, ArchiveFormat, ArchiveTrigger};
use crate::error::{IngestError, Result, SinkError};
use crossbeam_channel::Sender;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// One file eligible for archival, with enough metadata to apply the
/// count/age triggers without re-statting the filesystem repeatedly.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Selects which candidates should be archived right now, given the
/// project's archive trigger. `count` keeps the `config.count` most
/// recently modified files and selects the rest; `age` selects anything
/// older than `config.age` seconds as of `now`.
pub fn select_for_archival(
    config: &ArchiveConfig,
    mut candidates: Vec<Candidate>,
    now: SystemTime,
) -> Vec<Candidate> {
    match config.trigger {
        ArchiveTrigger::Count => {
            if candidates.len() as u64 <= config.count {
                return Vec::new();
            }
            candidates.sort_by_key(|c| c.modified);
            let excess = candidates.len() - config.count as usize;
            candidates.into_iter().take(excess).collect()
        }
        ArchiveTrigger::Age => {
            let max_age = Duration::from_secs(config.age);
            candidates
                .into_iter()
                .filter(|c| {
                    now.duration_since(c.modified)
                        .map(|age| age > max_age)
                        .unwrap_or(false)
                })
                .collect()
        }
    }
}

/// One unit of archival work dispatched to the worker pool.
pub struct ArchiveJob {
    pub source: PathBuf,
    pub archive_dir: PathBuf,
    pub format: ArchiveFormat,
    pub compression_level: u8,
}

fn archived_name(source: &Path, format: ArchiveFormat) -> PathBuf {
    let extension = match format {
        ArchiveFormat::Zip => "zip",
        ArchiveFormat::Tar => "tar",
        ArchiveFormat::Gz => "gz",
        ArchiveFormat::Bz2 => "bz2",
        ArchiveFormat::Xz => "xz",
    };
    source.with_extension(extension)
}

/// Compresses `job.source` into `job.archive_dir` in the configured format
/// and removes the original file. Idempotent: a pre-existing archive at the
/// target path is overwritten, so a retried job after a crash converges.
pub fn archive_file(job: &ArchiveJob) -> Result<PathBuf> {
    std::fs::create_dir_all(&job.archive_dir)?;
    let file_name = job
        .source
        .file_name()
        .ok_or_else(|| IngestError::from(SinkError::Archive("source has no file name".into())))?;
    let target = job.archive_dir.join(archived_name(Path::new(file_name), job.format));

    match job.format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipWriter::new(std::fs::File::create(&target)?);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .compression_level(Some(job.compression_level as i64));
            zip.start_file(file_name.to_string_lossy(), options)
                .map_err(|e| IngestError::from(SinkError::Archive(e.to_string())))?;
            let mut input = std::fs::File::open(&job.source)?;
            std::io::copy(&mut input, &mut zip)?;
            zip.finish()
                .map_err(|e| IngestError::from(SinkError::Archive(e.to_string())))?;
        }
        ArchiveFormat::Gz => {
            let mut input = std::fs::File::open(&job.source)?;
            let output = std::fs::File::create(&target)?;
            let level = flate2::Compression::new(job.compression_level as u32);
            let mut encoder = flate2::write::GzEncoder::new(output, level);
            std::io::copy(&mut input, &mut encoder)?;
            encoder.finish()?;
        }
        ArchiveFormat::Bz2 => {
            let mut input = std::fs::File::open(&job.source)?;
            let output = std::fs::File::create(&target)?;
            let level = bzip2::Compression::new(job.compression_level as u32);
            let mut encoder = bzip2::write::BzEncoder::new(output, level);
            std::io::copy(&mut input, &mut encoder)?;
            encoder.finish()?;
        }
        ArchiveFormat::Xz => {
            let mut input = std::fs::File::open(&job.source)?;
            let output = std::fs::File::create(&target)?;
            let mut encoder = xz2::write::XzEncoder::new(output, job.compression_level as u32);
            std::io::copy(&mut input, &mut encoder)?;
            encoder.finish()?;
        }
        ArchiveFormat::Tar => {
            let output = std::fs::File::create(&target)?;
            let mut builder = tar::Builder::new(output);
            builder
                .append_path_with_name(&job.source, file_name)
                .map_err(IngestError::from)?;
            builder.finish().map_err(IngestError::from)?;
        }
    }

    std::fs::remove_file(&job.source)?;
    Ok(target)
}

/// A bounded pool of archival workers, fed via an unbounded
/// `crossbeam_channel`. Compression for one project never blocks ingestion
/// for another since the file sink only enqueues and returns immediately.
pub struct ArchiveWorkerPool {
    sender: Sender<ArchiveJob>,
    pool: std::sync::Arc<rayon::ThreadPool>,
}

impl ArchiveWorkerPool {
    /// Spawns `worker_threads` rayon workers and one dispatch thread that
    /// pulls jobs off the channel and hands them to the pool. The pool and
    /// dispatch thread are leaked for the process lifetime, same as the
    /// supervisor's other background tasks.
    pub fn new(worker_threads: usize) -> std::result::Result<Self, rayon::ThreadPoolBuildError> {
        let pool = std::sync::Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(worker_threads)
                .thread_name(|i| format!("archive-worker-{i}"))
                .build()?,
        );
        let (sender, receiver) = crossbeam_channel::unbounded::<ArchiveJob>();

        let pool_handle = pool.clone();
        std::thread::Builder::new()
            .name("archive-dispatch".to_string())
            .spawn(move || {
                for job in receiver {
                    let path = job.source.clone();
                    pool_handle.spawn(move || {
                        if let Err(err) = archive_file(&job) {
                            tracing::warn!(error = %err, path = %path.display(), "failed to archive rotated log file");
                        }
                    });
                }
            })
            .expect("failed to spawn archive dispatch thread");

        Ok(Self { sender, pool })
    }

    /// Enqueues a job for background compression. Never blocks the caller.
    pub fn submit(&self, job: ArchiveJob) {
        let _ = self.sender.send(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn candidate(name: &str, age_secs: u64, now: SystemTime) -> Candidate {
        Candidate {
            path: PathBuf::from(name),
            modified: now - Duration::from_secs(age_secs),
        }
    }

    #[test]
    fn count_trigger_keeps_newest_and_selects_the_rest() {
        let now = SystemTime::now();
        let config = ArchiveConfig {
            trigger: ArchiveTrigger::Count,
            count: 2,
            ..ArchiveConfig::default()
        };
        let candidates = vec![
            candidate("a.log", 300, now),
            candidate("b.log", 200, now),
            candidate("c.log", 100, now),
        ];
        let selected = select_for_archival(&config, candidates, now);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].path, PathBuf::from("a.log"));
    }

    #[test]
    fn count_trigger_selects_nothing_under_the_limit() {
        let now = SystemTime::now();
        let config = ArchiveConfig {
            trigger: ArchiveTrigger::Count,
            count: 10,
            ..ArchiveConfig::default()
        };
        let candidates = vec![candidate("a.log", 300, now)];
        assert!(select_for_archival(&config, candidates, now).is_empty());
    }

    #[test]
    fn age_trigger_selects_files_older_than_the_limit() {
        let now = SystemTime::now();
        let config = ArchiveConfig {
            trigger: ArchiveTrigger::Age,
            age: 150,
            ..ArchiveConfig::default()
        };
        let candidates = vec![
            candidate("old.log", 300, now),
            candidate("new.log", 50, now),
        ];
        let selected = select_for_archival(&config, candidates, now);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].path, PathBuf::from("old.log"));
    }

    #[test]
    fn gz_archive_round_trips_content_and_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("p.log");
        std::fs::File::create(&source)
            .unwrap()
            .write_all(b"hello world")
            .unwrap();

        let job = ArchiveJob {
            source: source.clone(),
            archive_dir: dir.path().join("archive"),
            format: ArchiveFormat::Gz,
            compression_level: 6,
        };
        let target = archive_file(&job).unwrap();
        assert!(target.exists());
        assert!(!source.exists());

        let mut decoder = flate2::read::GzDecoder::new(std::fs::File::open(&target).unwrap());
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn zip_archive_is_created_and_source_removed() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("p.log");
        std::fs::File::create(&source)
            .unwrap()
            .write_all(b"zipped")
            .unwrap();

        let job = ArchiveJob {
            source: source.clone(),
            archive_dir: dir.path().join("archive"),
            format: ArchiveFormat::Zip,
            compression_level: 6,
        };
        let target = archive_file(&job).unwrap();
        assert!(target.exists());
        assert!(!source.exists());
    }
}
