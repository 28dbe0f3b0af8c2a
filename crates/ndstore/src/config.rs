//! Storage configuration.
//!
//! A [`StorageConfig`] travels with every container and decides which
//! backend new storage is allocated on, how large chained-list segments are,
//! where file-backed stores place their files, and how many threads bulk
//! routines may use.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::storage::MAX_INDEX;

/// Physical backing of element storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageKind {
    /// Chained in-memory arrays.
    #[default]
    Memory,
    /// Fixed-width records in a file.
    File,
}

/// Thread policy for bulk element routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadPolicy {
    /// Use every thread of the rayon pool.
    #[default]
    Available,
    /// Always run on the calling thread.
    Single,
    /// Use at most this many partitions.
    Fixed(usize),
}

impl ThreadPolicy {
    /// Number of partitions this policy allows.
    pub fn thread_count(self) -> usize {
        match self {
            ThreadPolicy::Available => rayon::current_num_threads().max(1),
            ThreadPolicy::Single => 1,
            ThreadPolicy::Fixed(n) => n.max(1),
        }
    }
}

/// Configuration for storage allocation and bulk routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend used for new storage.
    pub kind: StorageKind,
    /// Capacity of each chained-list segment.
    pub segment_capacity: usize,
    /// Directory for file-backed stores.
    pub file_dir: PathBuf,
    /// Thread policy for bulk routines.
    pub threads: ThreadPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::Memory,
            segment_capacity: MAX_INDEX,
            file_dir: std::env::temp_dir(),
            threads: ThreadPolicy::Available,
        }
    }
}

impl StorageConfig {
    /// In-memory configuration.
    pub fn memory() -> Self {
        Self::default()
    }

    /// File-backed configuration in the system temp directory.
    pub fn file() -> Self {
        Self::default().with_kind(StorageKind::File)
    }

    /// Read overrides from the environment.
    ///
    /// - `NDSTORE_STORAGE`: `memory` or `file`
    /// - `NDSTORE_DIR`: directory for file-backed stores
    /// - `NDSTORE_THREADS`: `0` or `available`, `1` or `single`, or a count
    ///
    /// Unrecognized values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var_os(name))
    }

    /// Build a configuration from variables looked up through `var`.
    ///
    /// Same variables and rules as [`Self::from_env`].
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Self::default();

        if let Some(kind) = var("NDSTORE_STORAGE") {
            match kind.to_string_lossy().to_ascii_lowercase().as_str() {
                "memory" => config.kind = StorageKind::Memory,
                "file" => config.kind = StorageKind::File,
                other => log::warn!("ignoring NDSTORE_STORAGE={other}"),
            }
        }
        if let Some(dir) = var("NDSTORE_DIR") {
            config.file_dir = PathBuf::from(dir);
        }
        if let Some(threads) = var("NDSTORE_THREADS") {
            config.threads = match threads.to_string_lossy().to_ascii_lowercase().as_str() {
                "available" | "0" => ThreadPolicy::Available,
                "single" | "1" => ThreadPolicy::Single,
                n => match n.parse::<usize>() {
                    Ok(n) => ThreadPolicy::Fixed(n),
                    Err(_) => {
                        log::warn!("ignoring NDSTORE_THREADS={n}");
                        config.threads
                    }
                },
            };
        }

        config
    }

    /// Set the backend kind.
    pub fn with_kind(mut self, kind: StorageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the chained-list segment capacity (clamped to `1..=MAX_INDEX`).
    pub fn with_segment_capacity(mut self, capacity: usize) -> Self {
        self.segment_capacity = capacity.clamp(1, MAX_INDEX);
        self
    }

    /// Set the directory for file-backed stores.
    pub fn with_file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_dir = dir.into();
        self
    }

    /// Set the thread policy.
    pub fn with_threads(mut self, threads: ThreadPolicy) -> Self {
        self.threads = threads;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = StorageConfig::default();
        assert_eq!(config.kind, StorageKind::Memory);
        assert_eq!(config.segment_capacity, MAX_INDEX);
        assert_eq!(config.threads, ThreadPolicy::Available);
    }

    #[test]
    fn test_builder() {
        let config = StorageConfig::file()
            .with_segment_capacity(0)
            .with_threads(ThreadPolicy::Fixed(3))
            .with_file_dir("/tmp/ndstore");
        assert_eq!(config.kind, StorageKind::File);
        assert_eq!(config.segment_capacity, 1);
        assert_eq!(config.threads, ThreadPolicy::Fixed(3));
        assert_eq!(config.file_dir, PathBuf::from("/tmp/ndstore"));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| OsString::from(v))
        }
    }

    #[test]
    fn test_from_vars_recognized() {
        let config = StorageConfig::from_vars(vars(&[
            ("NDSTORE_STORAGE", "File"),
            ("NDSTORE_DIR", "/var/tmp/nd"),
            ("NDSTORE_THREADS", "6"),
        ]));
        assert_eq!(config.kind, StorageKind::File);
        assert_eq!(config.file_dir, PathBuf::from("/var/tmp/nd"));
        assert_eq!(config.threads, ThreadPolicy::Fixed(6));

        let config = StorageConfig::from_vars(vars(&[
            ("NDSTORE_STORAGE", "memory"),
            ("NDSTORE_THREADS", "single"),
        ]));
        assert_eq!(config.kind, StorageKind::Memory);
        assert_eq!(config.threads, ThreadPolicy::Single);

        let config = StorageConfig::from_vars(vars(&[("NDSTORE_THREADS", "0")]));
        assert_eq!(config.threads, ThreadPolicy::Available);
        let config = StorageConfig::from_vars(vars(&[("NDSTORE_THREADS", "1")]));
        assert_eq!(config.threads, ThreadPolicy::Single);
    }

    #[test]
    fn test_from_vars_ignores_bad_values() {
        let config = StorageConfig::from_vars(vars(&[
            ("NDSTORE_STORAGE", "tape"),
            ("NDSTORE_THREADS", "many"),
        ]));
        assert_eq!(config, StorageConfig::default());
    }

    #[test]
    fn test_from_vars_unset_is_default() {
        assert_eq!(StorageConfig::from_vars(|_| None), StorageConfig::default());
    }

    #[test]
    fn test_thread_count() {
        assert_eq!(ThreadPolicy::Single.thread_count(), 1);
        assert_eq!(ThreadPolicy::Fixed(0).thread_count(), 1);
        assert_eq!(ThreadPolicy::Fixed(4).thread_count(), 4);
        assert!(ThreadPolicy::Available.thread_count() >= 1);
    }
}
