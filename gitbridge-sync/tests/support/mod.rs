//! Local bare-repository fixtures driven by the real `git` binary.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use gitbridge_core::Settings;
use tempfile::TempDir;

/// Temp tree: `compiles/` (watched root), `work/` (workspaces), `remotes/`.
pub struct Fixture {
    pub tmp: TempDir,
    pub compiles: PathBuf,
    pub work: PathBuf,
    pub remotes: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let tmp = TempDir::new().expect("tempdir");
        let compiles = tmp.path().join("compiles");
        let work = tmp.path().join("work");
        let remotes = tmp.path().join("remotes");
        for dir in [&compiles, &remotes] {
            fs::create_dir_all(dir).expect("mkdir");
        }
        Self {
            tmp,
            compiles,
            work,
            remotes,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            compiles_dir: self.compiles.clone(),
            workspace_root: self.work.clone(),
            ..Settings::default()
        }
    }

    /// An empty bare repository.
    pub fn empty_remote(&self, name: &str) -> PathBuf {
        let bare = self.remotes.join(format!("{name}.git"));
        git(&["init", "--bare", "-q", path_str(&bare)], self.tmp.path());
        bare
    }

    /// A bare repository whose `main` branch holds `files`.
    pub fn seeded_remote(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let bare = self.empty_remote(name);
        let seed = self.tmp.path().join(format!("seed_{name}"));
        fs::create_dir_all(&seed).expect("mkdir seed");
        git(&["init", "-q"], &seed);
        for (rel, content) in files {
            write_file(&seed.join(rel), content.as_bytes());
        }
        git(&["add", "-A"], &seed);
        git(&["commit", "-q", "-m", "seed"], &seed);
        git(&["push", "-q", path_str(&bare), "HEAD:refs/heads/main"], &seed);
        git(
            &["--git-dir", path_str(&bare), "symbolic-ref", "HEAD", "refs/heads/main"],
            self.tmp.path(),
        );
        bare
    }

    /// Create `compiles/<folder>` with `files` and a descriptor pointing at `url`.
    pub fn source(&self, folder: &str, url: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.compiles.join(folder);
        fs::create_dir_all(&dir).expect("mkdir source");
        write_file(
            &dir.join(".gitinfo"),
            format!(r#"{{"gitrepo": "{url}"}}"#).as_bytes(),
        );
        for (rel, content) in files {
            write_file(&dir.join(rel), content.as_bytes());
        }
        dir
    }
}

pub fn remote_url(bare: &Path) -> String {
    format!("file://{}", bare.display())
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir parent");
    }
    fs::write(path, content).expect("write file");
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// Run git with a throwaway identity; panics on failure.
pub fn git(args: &[&str], cwd: &Path) -> Vec<u8> {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Seed",
            "-c",
            "user.email=seed@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output.stdout
}

fn bare_git(bare: &Path, args: &[&str]) -> Vec<u8> {
    let mut full = vec!["--git-dir", path_str(bare)];
    full.extend_from_slice(args);
    git(&full, bare)
}

/// The single branch ref in `bare`, if any commit has been pushed.
pub fn branch_ref(bare: &Path) -> Option<String> {
    let out = bare_git(bare, &["for-each-ref", "--format=%(refname)", "refs/heads"]);
    String::from_utf8_lossy(&out)
        .lines()
        .next()
        .map(str::to_string)
}

pub fn commit_count(bare: &Path) -> usize {
    match branch_ref(bare) {
        None => 0,
        Some(r) => String::from_utf8_lossy(&bare_git(bare, &["rev-list", "--count", &r]))
            .trim()
            .parse()
            .expect("count"),
    }
}

/// `%s`, `%an` or another `git log -1 --format` placeholder of the tip commit.
pub fn tip(bare: &Path, format: &str) -> String {
    let r = branch_ref(bare).expect("remote has a branch");
    let fmt = format!("--format={format}");
    String::from_utf8_lossy(&bare_git(bare, &["log", "-1", &fmt, &r]))
        .trim()
        .to_string()
}

/// Tracked path -> bytes at the tip of the remote branch.
pub fn remote_files(bare: &Path) -> BTreeMap<String, Vec<u8>> {
    let Some(r) = branch_ref(bare) else {
        return BTreeMap::new();
    };
    let listing = bare_git(bare, &["ls-tree", "-r", "--name-only", &r]);
    String::from_utf8_lossy(&listing)
        .lines()
        .map(|path| {
            let spec = format!("{r}:{path}");
            (path.to_string(), bare_git(bare, &["show", &spec]))
        })
        .collect()
}

/// Relative path -> bytes for every file under `dir`, minus `exclude` names at the root.
pub fn local_files(dir: &Path, exclude: &[&str]) -> BTreeMap<String, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, exclude: &[&str], out: &mut BTreeMap<String, Vec<u8>>) {
        for entry in fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("entry").path();
            let rel = path
                .strip_prefix(root)
                .expect("prefix")
                .to_string_lossy()
                .into_owned();
            if exclude.contains(&rel.as_str()) {
                continue;
            }
            if path.is_dir() {
                walk(root, &path, exclude, out);
            } else {
                out.insert(rel, fs::read(&path).expect("read"));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, exclude, &mut out);
    out
}

/// Write an executable shell script at `path`.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    write_file(path, format!("#!/bin/sh\n{body}\n").as_bytes());
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}

/// Install a `pre-receive` hook on `bare` that refuses every push.
#[cfg(unix)]
pub fn reject_pushes(bare: &Path) {
    write_script(
        &bare.join("hooks").join("pre-receive"),
        "echo 'pushes are frozen' >&2\nexit 1",
    );
}
