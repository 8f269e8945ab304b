//! Destructive mirror of a source directory into a clone.
//!
//! ## Order
//!
//! 1. Copy the ignore template (if configured and present) to `.gitignore`.
//! 2. Delete every workspace root entry except `.git` and `.gitignore`.
//! 3. Copy every source root entry except the descriptor and `.git`.
//!
//! Nothing is merged: files absent from the source disappear from the clone.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::error::{io_err, SyncError};
use crate::workspace::remove_tree;

/// VCS metadata directory; never deleted from the workspace, never copied in.
pub const VCS_DIR: &str = ".git";

/// Ignore file preserved across the purge.
pub const IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions<'a> {
    pub descriptor_filename: &'a str,
    pub gitignore_template: Option<&'a Path>,
}

/// Counts of workspace root entries removed and source entries copied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub removed: usize,
    pub copied: usize,
}

/// Make `workspace` mirror `source`.
pub fn reconcile(
    workspace: &Path,
    source: &Path,
    options: &ReconcileOptions<'_>,
) -> Result<ReconcileStats, SyncError> {
    if let Some(template) = options.gitignore_template {
        apply_ignore_template(workspace, template)?;
    }

    let mut stats = ReconcileStats::default();

    for entry in sorted_entries(workspace)? {
        let name = entry.file_name().map(|n| n.to_string_lossy().into_owned());
        if matches!(name.as_deref(), Some(VCS_DIR) | Some(IGNORE_FILE)) {
            continue;
        }
        remove_tree(&entry).map_err(|e| io_err(&entry, e))?;
        stats.removed += 1;
    }

    for entry in sorted_entries(source)? {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let name_str = name.to_string_lossy();
        if name_str == options.descriptor_filename || name_str == VCS_DIR {
            continue;
        }
        copy_entry(&entry, &workspace.join(name))?;
        stats.copied += 1;
    }

    Ok(stats)
}

fn apply_ignore_template(workspace: &Path, template: &Path) -> Result<(), SyncError> {
    if !template.is_file() {
        tracing::debug!(
            "ignore template {} not found, leaving .gitignore as cloned",
            template.display()
        );
        return Ok(());
    }
    tracing::info!("adding/updating {IGNORE_FILE} from {}", template.display());
    let target = workspace.join(IGNORE_FILE);
    copy_file(template, &target)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| io_err(dir, e)))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

/// Copy a file or directory tree. Symlinks are followed.
fn copy_entry(src: &Path, dst: &Path) -> Result<(), SyncError> {
    if src.is_dir() {
        copy_dir(src, dst)
    } else {
        copy_file(src, dst)
    }
}

fn copy_dir(src: &Path, dst: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(dst).map_err(|e| io_err(dst, e))?;
    for entry in sorted_entries(src)? {
        if let Some(name) = entry.file_name() {
            copy_entry(&entry, &dst.join(name))?;
        }
    }
    let meta = fs::metadata(src).map_err(|e| io_err(src, e))?;
    filetime::set_file_mtime(dst, FileTime::from_last_modification_time(&meta))
        .map_err(|e| io_err(dst, e))
}

/// Copy contents and permissions (via `fs::copy`), then the modification time.
fn copy_file(src: &Path, dst: &Path) -> Result<(), SyncError> {
    fs::copy(src, dst).map_err(|e| io_err(src, e))?;
    let meta = fs::metadata(src).map_err(|e| io_err(src, e))?;
    filetime::set_file_mtime(dst, FileTime::from_last_modification_time(&meta))
        .map_err(|e| io_err(dst, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::{Duration, SystemTime};

    use tempfile::TempDir;

    use super::*;

    const OPTS: ReconcileOptions<'static> = ReconcileOptions {
        descriptor_filename: ".gitinfo",
        gitignore_template: None,
    };

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Relative path -> contents for every file under `root`, skipping `.git`.
    fn snapshot(root: &Path) -> BTreeMap<String, String> {
        fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<String, String>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                if rel == VCS_DIR {
                    continue;
                }
                if path.is_dir() {
                    walk(root, &path, out);
                } else {
                    out.insert(rel, fs::read_to_string(&path).unwrap());
                }
            }
        }
        let mut out = BTreeMap::new();
        walk(root, root, &mut out);
        out
    }

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let workspace = tmp.path().join("ws");
        let source = tmp.path().join("src");
        fs::create_dir_all(workspace.join(VCS_DIR)).unwrap();
        fs::create_dir_all(&source).unwrap();
        (tmp, workspace, source)
    }

    #[test]
    fn mirror_removes_stale_and_copies_new() {
        let (_tmp, ws, src) = fixture();
        write(&ws.join("old.tex"), "old");
        write(&ws.join("figs/old.png"), "png");
        write(&ws.join(VCS_DIR).join("HEAD"), "ref: refs/heads/main");
        write(&src.join("paper.tex"), "new paper");
        write(&src.join("sections/intro.tex"), "intro");
        write(&src.join(".gitinfo"), r#"{"gitrepo": "x"}"#);

        let stats = reconcile(&ws, &src, &OPTS).unwrap();

        assert_eq!(stats, ReconcileStats { removed: 2, copied: 2 });
        let files = snapshot(&ws);
        assert_eq!(
            files.keys().cloned().collect::<Vec<_>>(),
            vec!["paper.tex".to_string(), "sections/intro.tex".to_string()]
        );
        assert_eq!(files["paper.tex"], "new paper");
        assert!(ws.join(VCS_DIR).join("HEAD").exists(), ".git must survive");
        assert!(!ws.join(".gitinfo").exists(), "descriptor must not be copied");
    }

    #[test]
    fn cloned_gitignore_survives_purge() {
        let (_tmp, ws, src) = fixture();
        write(&ws.join(IGNORE_FILE), "*.aux\n");
        write(&src.join("paper.tex"), "p");

        reconcile(&ws, &src, &OPTS).unwrap();
        assert_eq!(fs::read_to_string(ws.join(IGNORE_FILE)).unwrap(), "*.aux\n");
    }

    #[test]
    fn template_overwrites_cloned_gitignore() {
        let (tmp, ws, src) = fixture();
        write(&ws.join(IGNORE_FILE), "*.aux\n");
        let template = tmp.path().join("gitignore.example");
        write(&template, "*.log\n*.synctex.gz\n");

        let opts = ReconcileOptions {
            gitignore_template: Some(&template),
            ..OPTS
        };
        reconcile(&ws, &src, &opts).unwrap();
        assert_eq!(
            fs::read_to_string(ws.join(IGNORE_FILE)).unwrap(),
            "*.log\n*.synctex.gz\n"
        );
    }

    #[test]
    fn missing_template_is_skipped() {
        let (tmp, ws, src) = fixture();
        let template = tmp.path().join("absent");
        let opts = ReconcileOptions {
            gitignore_template: Some(&template),
            ..OPTS
        };
        reconcile(&ws, &src, &opts).unwrap();
        assert!(!ws.join(IGNORE_FILE).exists());
    }

    #[test]
    fn source_git_directory_is_not_copied() {
        let (_tmp, ws, src) = fixture();
        write(&src.join(VCS_DIR).join("config"), "[core]");
        write(&src.join("paper.tex"), "p");

        reconcile(&ws, &src, &OPTS).unwrap();
        assert!(!ws.join(VCS_DIR).join("config").exists());
        assert!(ws.join("paper.tex").exists());
    }

    #[test]
    fn modification_times_are_preserved() {
        let (_tmp, ws, src) = fixture();
        let file = src.join("paper.tex");
        write(&file, "p");
        let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(86_400));
        filetime::set_file_mtime(&file, old).unwrap();

        reconcile(&ws, &src, &OPTS).unwrap();
        let copied = fs::metadata(ws.join("paper.tex")).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), old);
    }

    #[test]
    #[cfg(unix)]
    fn executable_bit_is_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, ws, src) = fixture();
        let script = src.join("build.sh");
        write(&script, "#!/bin/sh\n");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        reconcile(&ws, &src, &OPTS).unwrap();
        let mode = fs::metadata(ws.join("build.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn empty_source_empties_workspace() {
        let (_tmp, ws, src) = fixture();
        write(&ws.join("a.tex"), "a");
        write(&ws.join("b.tex"), "b");

        let stats = reconcile(&ws, &src, &OPTS).unwrap();
        assert_eq!(stats, ReconcileStats { removed: 2, copied: 0 });
        assert!(snapshot(&ws).is_empty());
    }
}
