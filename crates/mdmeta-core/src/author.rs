//! Author detection from git history, the environment and file ownership.

use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Contributors folded into the primary author when no last-commit author exists.
const CONTRIBUTOR_LIMIT: usize = 3;

/// Where a detected author came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorSource {
    GitLastCommit,
    GitContributors,
    Environment,
    FileOwner,
    Fallback,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthorInfo {
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_last_author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub git_contributors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_owner: Option<String>,
}

/// Directory git commands for `path` run in, plus the name passed after `--`.
fn git_location(path: &Path) -> (&Path, &OsStr) {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path.file_name().unwrap_or(path.as_os_str());
    (dir, name)
}

/// Upper bound for a single git invocation.
const GIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs git in `dir`; `None` when git is missing, fails or exceeds [`GIT_TIMEOUT`].
fn run_git(dir: &Path, args: &[&str], file: Option<&OsStr>) -> Option<Vec<u8>> {
    let mut cmd = Command::new("git");
    cmd.args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if let Some(file) = file {
        cmd.arg("--").arg(file);
    }
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "git not available");
            return None;
        }
    };

    // Drain stdout concurrently so a large log cannot block the child on a full pipe.
    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });

    let status = match child.wait_timeout(GIT_TIMEOUT) {
        Ok(Some(status)) => status,
        Ok(None) => {
            tracing::warn!(?args, dir = %dir.display(), "git timed out");
            let _ = child.kill();
            let _ = child.wait();
            return None;
        }
        Err(e) => {
            tracing::debug!(error = %e, "waiting for git failed");
            let _ = child.kill();
            let _ = child.wait();
            return None;
        }
    };
    let output = reader.join().ok()?.ok()?;
    status.success().then_some(output)
}

fn git_stdout(dir: &Path, args: &[&str], file: Option<&OsStr>) -> Option<String> {
    let output = run_git(dir, args, file)?;
    String::from_utf8(output).ok().map(|s| s.trim().to_string())
}

/// Adds a bounded wait to [`Child`].
trait ChildExt {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(20);
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(Some(status));
            }
            if start.elapsed() >= timeout {
                return Ok(None);
            }
            std::thread::sleep(poll_interval);
        }
    }
}

pub fn is_git_repository(path: &Path) -> bool {
    let (dir, _) = git_location(path);
    run_git(dir, &["rev-parse", "--git-dir"], None).is_some()
}

/// Author of the last commit touching `path`, falling back to the configured git user.
pub fn git_author(path: &Path) -> Option<String> {
    let (dir, name) = git_location(path);
    let last = git_stdout(dir, &["log", "-1", "--pretty=format:%an <%ae>"], Some(name));
    if let Some(author) = last.filter(|s| !s.is_empty()) {
        return Some(author);
    }

    let user_name = git_stdout(dir, &["config", "user.name"], None)?;
    let user_email = git_stdout(dir, &["config", "user.email"], None)?;
    if user_name.is_empty() || user_email.is_empty() {
        return None;
    }
    Some(format!("{user_name} <{user_email}>"))
}

/// Everyone who modified `path`, most recent first, without duplicates.
pub fn git_contributors(path: &Path) -> Vec<String> {
    let (dir, name) = git_location(path);
    let Some(log) = git_stdout(
        dir,
        &["log", "--pretty=format:%an <%ae>", "--follow"],
        Some(name),
    ) else {
        return Vec::new();
    };
    dedupe_lines(&log)
}

fn dedupe_lines(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_string()))
        .map(str::to_string)
        .collect()
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Author from `AUTHOR_*`/`USER_*` variables, else the login name.
pub fn system_author() -> String {
    let name = env_nonempty("AUTHOR_NAME").or_else(|| env_nonempty("USER_NAME"));
    let email = env_nonempty("AUTHOR_EMAIL").or_else(|| env_nonempty("USER_EMAIL"));
    match (name, email) {
        (Some(name), Some(email)) => return format!("{name} <{email}>"),
        (Some(name), None) => return name,
        _ => {}
    }

    ["LOGNAME", "USER", "LNAME", "USERNAME"]
        .iter()
        .find_map(|k| env_nonempty(k))
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

#[cfg(unix)]
pub fn file_owner(path: &Path) -> Option<String> {
    use std::os::unix::fs::MetadataExt;

    let uid = std::fs::metadata(path).ok()?.uid();
    nix::unistd::User::from_uid(nix::unistd::Uid::from_raw(uid))
        .ok()
        .flatten()
        .map(|u| u.name)
}

#[cfg(not(unix))]
pub fn file_owner(_path: &Path) -> Option<String> {
    None
}

/// Picks the best available author for `path`.
pub fn determine_author(path: &Path, prefer_git: bool) -> (String, AuthorSource) {
    if prefer_git && is_git_repository(path) {
        if let Some(author) = git_author(path) {
            return (author, AuthorSource::GitLastCommit);
        }
        let contributors = git_contributors(path);
        if !contributors.is_empty() {
            let joined = contributors
                .iter()
                .take(CONTRIBUTOR_LIMIT)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            return (joined, AuthorSource::GitContributors);
        }
    }

    let system = system_author();
    if system != UNKNOWN_AUTHOR {
        return (system, AuthorSource::Environment);
    }

    if let Some(owner) = file_owner(path) {
        return (owner, AuthorSource::FileOwner);
    }

    (UNKNOWN_AUTHOR.to_string(), AuthorSource::Fallback)
}

/// Primary author plus, when `detailed`, what each detection method reports.
pub fn author_info(path: &Path, prefer_git: bool, detailed: bool) -> AuthorInfo {
    let (author, source) = determine_author(path, prefer_git);
    tracing::debug!(path = %path.display(), ?source, %author, "author detected");

    let mut info = AuthorInfo {
        author,
        ..AuthorInfo::default()
    };
    if detailed {
        if is_git_repository(path) {
            info.git_last_author = git_author(path);
            info.git_contributors = git_contributors(path);
        }
        info.system_author = Some(system_author());
        info.file_owner = file_owner(path);
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard(Vec<(&'static str, Option<String>)>);

    impl EnvGuard {
        fn set(vars: &[(&'static str, Option<&str>)]) -> Self {
            let saved = vars
                .iter()
                .map(|(k, _)| (*k, std::env::var(k).ok()))
                .collect();
            for (k, v) in vars {
                match v {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
            Self(saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (k, v) in &self.0 {
                match v {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    const ALL: [&str; 8] = [
        "AUTHOR_NAME",
        "USER_NAME",
        "AUTHOR_EMAIL",
        "USER_EMAIL",
        "LOGNAME",
        "USER",
        "LNAME",
        "USERNAME",
    ];

    fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
        ALL.iter().map(|k| (*k, None)).collect()
    }

    #[test]
    #[serial]
    fn env_name_and_email() {
        let mut vars = cleared();
        vars.push(("AUTHOR_NAME", Some("Ada")));
        vars.push(("USER_EMAIL", Some("ada@example.com")));
        let _g = EnvGuard::set(&vars);
        assert_eq!(system_author(), "Ada <ada@example.com>");
    }

    #[test]
    #[serial]
    fn env_name_only_then_login() {
        let mut vars = cleared();
        vars.push(("USER_NAME", Some("Grace")));
        let _g = EnvGuard::set(&vars);
        assert_eq!(system_author(), "Grace");
        drop(_g);

        let mut vars = cleared();
        vars.push(("USER", Some("ghopper")));
        let _g = EnvGuard::set(&vars);
        assert_eq!(system_author(), "ghopper");
    }

    #[test]
    #[serial]
    fn nothing_set_is_unknown() {
        let _g = EnvGuard::set(&cleared());
        assert_eq!(system_author(), UNKNOWN_AUTHOR);
    }

    #[test]
    #[serial]
    fn outside_git_uses_environment() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.md");
        std::fs::write(&file, "# Doc").unwrap();

        let mut vars = cleared();
        vars.push(("AUTHOR_NAME", Some("Lin")));
        let _g = EnvGuard::set(&vars);
        let (author, source) = determine_author(&file, false);
        assert_eq!(author, "Lin");
        assert_eq!(source, AuthorSource::Environment);

        let info = author_info(&file, false, true);
        assert_eq!(info.author, "Lin");
        assert_eq!(info.system_author.as_deref(), Some("Lin"));
    }

    #[test]
    fn contributors_are_deduplicated_in_order() {
        let log = "B <b@x>\nA <a@x>\nB <b@x>\n\nC <c@x>\n";
        assert_eq!(dedupe_lines(log), vec!["B <b@x>", "A <a@x>", "C <c@x>"]);
    }

    #[test]
    fn git_location_of_bare_file_name() {
        let (dir, name) = git_location(Path::new("README.md"));
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "README.md");
    }

    #[cfg(unix)]
    #[test]
    fn wait_timeout_gives_up_on_slow_child() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let started = Instant::now();
        assert!(child.wait_timeout(Duration::from_millis(100)).unwrap().is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn wait_timeout_returns_status_of_fast_child() {
        let mut child = Command::new("true").spawn().unwrap();
        let status = child.wait_timeout(Duration::from_secs(5)).unwrap();
        assert!(status.is_some_and(|s| s.success()));
    }
}
