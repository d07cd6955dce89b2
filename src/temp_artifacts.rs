//! # Transient artifacts
//!
//! Every local file a pipeline run creates (downloaded frames, aligned copies, the rendered
//! JPEG) is tracked by one [`TempArtifacts`] arena. The arena remembers every path it has ever
//! seen and removes all of them when [`TempArtifacts::cleanup`] runs, which `Drop` guarantees on
//! every exit path, early returns and unwinding included.
//!
//! Paths are reserved before the file is written, so a download that fails half way still
//! leaves nothing behind. File names carry a random component so concurrent runs never share a
//! path.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::settings::Settings;

#[derive(Debug)]
pub struct TempArtifacts {
    tmp_dir: Utf8PathBuf,
    prefix: String,
    all_paths: BTreeSet<Utf8PathBuf>,
    current: Vec<Utf8PathBuf>,
}

impl TempArtifacts {
    pub fn new(settings: &Settings) -> Self {
        TempArtifacts {
            tmp_dir: settings.tmp_dir.clone(),
            prefix: settings.temp_filename_prefix.clone(),
            all_paths: BTreeSet::new(),
            current: Vec::new(),
        }
    }

    pub fn tmp_dir(&self) -> &Utf8Path {
        &self.tmp_dir
    }

    /// Build a fresh path `{tmp_dir}/{prefix}{random}-{name}` and start tracking it.
    ///
    /// The file itself is not created.
    pub fn reserve(&mut self, name: &str) -> Utf8PathBuf {
        let path = self.tmp_dir.join(format!(
            "{}{}-{}",
            self.prefix,
            Uuid::new_v4().simple(),
            name
        ));
        self.all_paths.insert(path.clone());
        path
    }

    /// Replace the current working set, keeping every path in the cleanup set.
    pub fn register(&mut self, paths: Vec<Utf8PathBuf>) {
        self.all_paths.extend(paths.iter().cloned());
        self.current = paths;
    }

    /// The working set handed to the next pipeline step.
    pub fn current(&self) -> &[Utf8PathBuf] {
        &self.current
    }

    pub fn all_ever_registered(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.all_paths.iter()
    }

    /// Remove every tracked path from disk.
    ///
    /// Missing files are skipped. Each path is removed at most once: the arena is empty
    /// afterwards.
    ///
    /// Return
    /// ------
    /// * The number of files actually removed
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in std::mem::take(&mut self.all_paths) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => warn!("Unable to remove transient file {path}: {err}"),
            }
        }
        self.current.clear();
        if removed > 0 {
            debug!("Removed {removed} transient files");
        }
        removed
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}
