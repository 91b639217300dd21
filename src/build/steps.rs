//! Individual build steps
//!
//! Every step can be re-run on a partially built slot and ends in the same
//! state. Only the file copy step reports per-entry failures instead of
//! returning an error.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::container::{ContainerRecord, SKELETON_DIRS};
use crate::error::{ContinyError, Result};

/// Mode of generated scripts
const SCRIPT_MODE: u32 = 0o755;

/// Create the slot and its skeleton. Existing directories are fine.
pub fn scaffold(record: &ContainerRecord) -> Result<()> {
    fs::create_dir_all(&record.base_dir)?;
    fs::create_dir_all(&record.rootfs_dir)?;

    for dir in SKELETON_DIRS {
        fs::create_dir_all(record.rootfs_dir.join(dir))?;
    }

    tracing::debug!(container = %record.name, rootfs = %record.rootfs_dir.display(), "scaffolded");
    Ok(())
}

/// Write a generated script and mark it executable
pub fn write_script(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    set_executable(path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote script");
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(SCRIPT_MODE))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    let _ = SCRIPT_MODE;
    Ok(())
}

/// Why one file entry could not be copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyFailureKind {
    /// The host source does not exist
    MissingSource,
    /// The destination is empty or leaves the staged root
    InvalidDestination,
    /// Reading or writing failed
    Io,
}

impl std::fmt::Display for CopyFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CopyFailureKind::MissingSource => "missing source",
            CopyFailureKind::InvalidDestination => "invalid destination",
            CopyFailureKind::Io => "io error",
        };
        write!(f, "{}", s)
    }
}

/// A file entry that was not copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyFailure {
    pub source: String,
    pub destination: String,
    pub kind: CopyFailureKind,
    pub message: String,
}

/// A file entry that was copied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedFile {
    pub source: String,
    pub destination: String,
    pub target: PathBuf,
}

/// Outcome of the copy step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    pub copied: Vec<CopiedFile>,
    pub failures: Vec<CopyFailure>,
}

/// Copy every declared file into the staged root.
///
/// Entries are handled in declaration order. A failing entry is recorded
/// and the next one is attempted.
pub fn copy_files<'a, I>(record: &ContainerRecord, files: I) -> CopyOutcome
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut outcome = CopyOutcome::default();

    for (source, destination) in files {
        match copy_entry(&record.rootfs_dir, source, destination) {
            Ok(target) => {
                tracing::debug!(source = %source, target = %target.display(), "copied");
                outcome.copied.push(CopiedFile {
                    source: source.clone(),
                    destination: destination.clone(),
                    target,
                });
            }
            Err(e) => {
                let kind = match &e {
                    ContinyError::MissingSource(_) => CopyFailureKind::MissingSource,
                    ContinyError::InvalidConfig(_) => CopyFailureKind::InvalidDestination,
                    _ => CopyFailureKind::Io,
                };
                tracing::debug!(container = %record.name, source = %source, "copy failed: {}", e);
                outcome.failures.push(CopyFailure {
                    source: source.clone(),
                    destination: destination.clone(),
                    kind,
                    message: e.to_string(),
                });
            }
        }
    }

    outcome
}

/// Resolve a container path against the staged root.
///
/// A leading `/` is dropped. Paths that resolve to the root itself or climb
/// out of it are rejected.
pub fn resolve_destination(rootfs: &Path, destination: &str) -> Result<PathBuf> {
    let relative = Path::new(destination.trim_start_matches('/'));

    let mut has_normal = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            _ => {
                return Err(ContinyError::InvalidConfig(format!(
                    "destination '{}' escapes the container root",
                    destination
                )))
            }
        }
    }
    if !has_normal {
        return Err(ContinyError::InvalidConfig(format!(
            "destination '{}' names the container root",
            destination
        )));
    }

    Ok(rootfs.join(relative))
}

fn copy_entry(rootfs: &Path, source: &str, destination: &str) -> Result<PathBuf> {
    let target = resolve_destination(rootfs, destination)?;

    let source_path = Path::new(source);
    let metadata = match fs::metadata(source_path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ContinyError::MissingSource(source.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    if metadata.is_dir() {
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        } else if target.exists() {
            fs::remove_file(&target)?;
        }
        copy_dir_recursive(source_path, &target)?;
        Ok(target)
    } else {
        // A file copied onto a directory lands inside it
        let target = match source_path.file_name() {
            Some(file_name) if target.is_dir() => target.join(file_name),
            _ => target,
        };
        copy_file_preserving(source_path, &target)?;
        Ok(target)
    }
}

/// Copy a file with its permissions and timestamps
fn copy_file_preserving(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;

    let metadata = fs::metadata(src)?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    // Owner-only timestamps do not need a writable handle, so read-only
    // sources copied with their mode still get their times.
    File::open(dst)?.set_times(times)
}

/// Recursively copy a directory.
fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file_preserving(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn record_in(temp_dir: &TempDir) -> ContainerRecord {
        ContainerRecord::new(&temp_dir.path().join("store"), "demo")
    }

    #[test]
    fn test_scaffold_creates_skeleton() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();

        for dir in SKELETON_DIRS {
            assert!(record.rootfs_dir.join(dir).is_dir(), "{} missing", dir);
        }
    }

    #[test]
    fn test_scaffold_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();
        fs::write(record.rootfs_dir.join("etc/keep"), "x").unwrap();
        scaffold(&record).unwrap();
        assert!(record.rootfs_dir.join("etc/keep").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_script_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.sh");
        write_script(&path, "#!/bin/bash\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_resolve_destination() {
        let root = Path::new("/store/demo/rootfs");
        assert_eq!(
            resolve_destination(root, "/workspace/a.txt").unwrap(),
            root.join("workspace/a.txt")
        );
        assert_eq!(resolve_destination(root, "etc/app.conf").unwrap(), root.join("etc/app.conf"));
        assert!(resolve_destination(root, "/").is_err());
        assert!(resolve_destination(root, "").is_err());
        assert!(resolve_destination(root, "/workspace/../../escape").is_err());
    }

    #[test]
    fn test_copy_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();

        let file = temp_dir.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();
        let dir = temp_dir.path().join("project");
        fs::create_dir_all(dir.join("pkg")).unwrap();
        fs::write(dir.join("pkg/main.py"), "print(1)").unwrap();

        let mut files = IndexMap::new();
        files.insert(file.to_string_lossy().to_string(), "/workspace/notes.txt".to_string());
        files.insert(dir.to_string_lossy().to_string(), "/workspace/project".to_string());

        let outcome = copy_files(&record, &files);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.copied.len(), 2);
        assert_eq!(
            fs::read_to_string(record.rootfs_dir.join("workspace/notes.txt")).unwrap(),
            "hello"
        );
        assert!(record.rootfs_dir.join("workspace/project/pkg/main.py").is_file());
    }

    #[test]
    fn test_copy_directory_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();

        let stale = record.rootfs_dir.join("workspace/project/stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let dir = temp_dir.path().join("project");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("fresh.txt"), "new").unwrap();

        let mut files = IndexMap::new();
        files.insert(dir.to_string_lossy().to_string(), "workspace/project".to_string());
        let outcome = copy_files(&record, &files);

        assert!(outcome.failures.is_empty());
        assert!(!stale.exists());
        assert!(record.rootfs_dir.join("workspace/project/fresh.txt").is_file());
    }

    #[test]
    fn test_copy_preserves_modified_time() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("old.txt");
        let dst = temp_dir.path().join("copy.txt");
        fs::write(&src, "data").unwrap();

        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        copy_file_preserving(&src, &dst).unwrap();
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_copy_failures_do_not_stop_later_entries() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();

        let present = temp_dir.path().join("present.txt");
        fs::write(&present, "ok").unwrap();

        let mut files = IndexMap::new();
        files.insert("missing.txt".to_string(), "/workspace/b".to_string());
        files.insert(present.to_string_lossy().to_string(), "/workspace/a".to_string());

        let outcome = copy_files(&record, &files);
        assert_eq!(outcome.copied.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, CopyFailureKind::MissingSource);
        assert_eq!(outcome.failures[0].source, "missing.txt");
        assert!(record.rootfs_dir.join("workspace/a").is_file());
    }

    #[test]
    fn test_copy_file_into_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();

        let app = temp_dir.path().join("app.py");
        fs::write(&app, "print(1)").unwrap();

        let mut files = IndexMap::new();
        files.insert(app.to_string_lossy().to_string(), "/workspace".to_string());

        let outcome = copy_files(&record, &files);
        assert!(outcome.failures.is_empty());
        let expected = record.rootfs_dir.join("workspace/app.py");
        assert_eq!(outcome.copied[0].target, expected);
        assert_eq!(fs::read_to_string(&expected).unwrap(), "print(1)");
        assert!(record.rootfs_dir.join("workspace").is_dir());
    }

    #[test]
    fn test_copy_write_failure_is_io() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();
        fs::write(record.rootfs_dir.join("etc/blocker"), "not a directory").unwrap();

        let present = temp_dir.path().join("present.txt");
        fs::write(&present, "ok").unwrap();

        let mut files = IndexMap::new();
        files.insert(present.to_string_lossy().to_string(), "/etc/blocker/app.conf".to_string());

        let outcome = copy_files(&record, &files);
        assert!(outcome.copied.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, CopyFailureKind::Io);
    }

    #[test]
    fn test_copy_rejects_escaping_destination() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_in(&temp_dir);
        scaffold(&record).unwrap();

        let present = temp_dir.path().join("present.txt");
        fs::write(&present, "ok").unwrap();

        let mut files = IndexMap::new();
        files.insert(present.to_string_lossy().to_string(), "/../outside".to_string());

        let outcome = copy_files(&record, &files);
        assert!(outcome.copied.is_empty());
        assert_eq!(outcome.failures[0].kind, CopyFailureKind::InvalidDestination);
        assert!(!record.base_dir.join("outside").exists());
    }
}
