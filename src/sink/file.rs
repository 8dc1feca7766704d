//! File sink
//!
//! Writes one rotating, project-scoped log file per project, framed with a
//! box-drawn header/footer, and sweeps old rotated files into the archive
//! directory once retention is exceeded. All state lives on a single
//! dedicated worker thread — the same "one writer owns all project state"
//! shape the original async `Writer` used, just realized as an OS thread
//! plus channel instead of a coroutine.

use crate::archive::{ArchiveJob, ArchiveWorkerPool, Candidate};
use crate::archive::select_for_archival;
use crate::config::FilesConfig;
use crate::format;
use crate::framing;
use crate::record::LogRecord;
use crate::rotation::{self, RotationState};
use chrono::Utc;
use crossbeam_channel::{Sender, unbounded};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

struct ProjectFileState {
    log_dir: PathBuf,
    archive_dir: PathBuf,
    path: PathBuf,
    handle: BufWriter<File>,
    rotation: RotationState,
}

/// Fire-and-forget file writer. `write` enqueues a record on an unbounded
/// channel and returns immediately; a dedicated thread performs all
/// filesystem work.
pub struct FileSink {
    sender: Sender<LogRecord>,
}

impl FileSink {
    pub fn new(config: FilesConfig, archive_pool: Arc<ArchiveWorkerPool>) -> Self {
        let (sender, receiver) = unbounded::<LogRecord>();

        std::thread::Builder::new()
            .name("file-sink".to_string())
            .spawn(move || {
                let mut states: HashMap<String, ProjectFileState> = HashMap::new();
                for record in receiver {
                    if let Err(err) = handle_record(&config, &archive_pool, &mut states, &record) {
                        tracing::warn!(error = %err, project = %record.project, "file sink failed to write record");
                    }
                }
                for (project, state) in states {
                    close_file(&project, state, &config.date_timezone);
                }
            })
            .expect("failed to spawn file sink thread");

        Self { sender }
    }

    /// Enqueues `record` for writing. Never blocks on filesystem I/O.
    pub fn write(&self, record: LogRecord) {
        let _ = self.sender.send(record);
    }
}

fn handle_record(
    config: &FilesConfig,
    archive_pool: &Arc<ArchiveWorkerPool>,
    states: &mut HashMap<String, ProjectFileState>,
    record: &LogRecord,
) -> std::io::Result<()> {
    if !states.contains_key(&record.project) {
        let state = open_new_file(config, &record.project)?;
        states.insert(record.project.clone(), state);
    }

    let now = Utc::now();
    let needs_rotation = {
        let state = states.get(&record.project).unwrap();
        rotation::should_rotate(&config.rotation, &state.rotation, now)
    };
    if needs_rotation {
        let old_state = states.remove(&record.project).unwrap();
        close_file(&record.project, old_state, &config.date_timezone);
        let new_state = open_new_file(config, &record.project)?;
        states.insert(record.project.clone(), new_state);
        if config.archive.enabled {
            sweep_archive(config, archive_pool, &record.project, states);
        }
    }

    let timestamp_text =
        format::format_timestamp(record.timestamp, &config.date_timezone, &config.date_log_format);
    let line = format::render(&config.log_format, record, &timestamp_text);

    let write_result = {
        let state = states.get_mut(&record.project).unwrap();
        writeln!(state.handle, "{line}").and_then(|_| state.handle.flush())
    };

    match write_result {
        Ok(()) => {
            let state = states.get_mut(&record.project).unwrap();
            state.rotation.count_lines += 1;
            state.rotation.current_size =
                std::fs::metadata(&state.path).map(|m| m.len()).unwrap_or(state.rotation.current_size);
            Ok(())
        }
        Err(err) => {
            // The current file is in an unknown state after a failed write;
            // drop it and let the next record open a fresh one rather than
            // risk reusing a handle that keeps failing.
            tracing::warn!(error = %err, project = %record.project, "file sink write failed, dropping record and forcing rotation");
            if let Some(broken) = states.remove(&record.project) {
                drop(broken.handle);
            }
            Ok(())
        }
    }
}

fn project_log_dir(config: &FilesConfig, project: &str) -> PathBuf {
    let project_dir = config.project_directory.replace("{project}", project);
    PathBuf::from(&config.shared_directory).join(project_dir)
}

fn open_new_file(config: &FilesConfig, project: &str) -> std::io::Result<ProjectFileState> {
    let log_dir = project_log_dir(config, project);
    std::fs::create_dir_all(&log_dir)?;
    let archive_dir = log_dir.join(&config.archive.directory);
    std::fs::create_dir_all(&archive_dir)?;

    let opened_at = Utc::now();
    let date_str = opened_at.format(&config.date_file_format).to_string();
    let file_name = config
        .filename
        .replace("{project}", project)
        .replace("{date}", &date_str);
    let path = log_dir.join(&file_name);

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let mut handle = BufWriter::new(file);
    let header = framing::header(&file_name, project, opened_at, &config.date_timezone);
    handle.write_all(header.as_bytes())?;
    handle.flush()?;

    let initial_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(header.len() as u64);

    Ok(ProjectFileState {
        log_dir,
        archive_dir,
        path,
        handle,
        rotation: RotationState::fresh(opened_at, initial_size),
    })
}

fn close_file(project: &str, mut state: ProjectFileState, timezone: &str) {
    let total_lines = state.rotation.count_lines;
    let _ = state.handle.flush();
    drop(state.handle);

    let file_size = std::fs::metadata(&state.path).map(|m| m.len()).unwrap_or(0);
    let footer = framing::footer(total_lines, file_size, Utc::now(), timezone);
    if let Ok(mut file) = OpenOptions::new().append(true).open(&state.path) {
        if let Err(err) = file.write_all(footer.as_bytes()) {
            tracing::warn!(error = %err, project, "failed to append footer to closed log file");
        }
    }
}

fn sweep_archive(
    config: &FilesConfig,
    archive_pool: &Arc<ArchiveWorkerPool>,
    project: &str,
    states: &HashMap<String, ProjectFileState>,
) {
    let Some(active_state) = states.get(project) else {
        return;
    };
    let entries = match std::fs::read_dir(&active_state.log_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path == active_state.path {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        candidates.push(Candidate { path, modified });
    }

    let selected = select_for_archival(&config.archive, candidates, std::time::SystemTime::now());
    for candidate in selected {
        archive_pool.submit(ArchiveJob {
            source: candidate.path,
            archive_dir: active_state.archive_dir.clone(),
            format: config.archive.format,
            compression_level: config.archive.compression_level,
        });
    }
}
