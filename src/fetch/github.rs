//! GitHub repository URLs: parsing, reference resolution and cloning

use crate::fetch::RepoContext;
use anyhow::{Context, Result};
use git2::{Cred, Direction, FetchOptions, Remote, RemoteCallbacks, Repository};
use std::env;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Parsed form of `https://github.com/<owner>/<repo>[/tree/<rest>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubUrl {
    pub owner: String,
    pub repo: String,
    /// Everything after `/tree/`: a ref, optionally followed by a path.
    pub rest: Option<String>,
}

impl GithubUrl {
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }
}

pub fn is_github_url(url: &str) -> bool {
    url.trim_start().starts_with("https://github.com/")
}

pub fn parse_repo_url(url: &str) -> Result<GithubUrl> {
    let invalid = || {
        anyhow::anyhow!(
            "Invalid GitHub repository URL: {url}. Expected https://github.com/owner/repo \
             or https://github.com/owner/repo/tree/branch/path"
        )
    };

    let trimmed = url.trim().trim_end_matches('/');
    let path = trimmed.strip_prefix("https://github.com/").ok_or_else(invalid)?;
    let mut parts = path.splitn(4, '/');
    let owner = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let repo = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    let rest = match (parts.next(), parts.next()) {
        (None, _) => None,
        (Some("tree"), Some(rest)) if !rest.is_empty() => Some(rest.to_string()),
        _ => return Err(invalid()),
    };

    Ok(GithubUrl { owner: owner.to_string(), repo: repo.to_string(), rest })
}

/// Split `rest` into `(reference, subpath)` using the known branch/tag names.
///
/// The longest name equal to `rest`, or followed by `/` in it, wins. Without
/// a match the whole of `rest` is taken as the reference.
pub fn split_reference(rest: &str, references: &[String]) -> (String, Option<String>) {
    let matched = references
        .iter()
        .filter(|r| rest == r.as_str() || rest.starts_with(&format!("{r}/")))
        .max_by_key(|r| r.len());

    match matched {
        Some(reference) => {
            let path = rest[reference.len()..].trim_start_matches('/');
            let path = (!path.is_empty()).then(|| path.to_string());
            (reference.clone(), path)
        }
        None => (rest.to_string(), None),
    }
}

/// Credential callbacks for an optional access token.
///
/// The token is offered once; a second request means it was rejected, and
/// failing then stops libgit2 from asking forever.
pub fn remote_callbacks(token: Option<&str>) -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    if let Some(token) = normalize_token(token) {
        let mut attempts = 0usize;
        callbacks.credentials(move |_url, _username, _allowed| {
            let cred = token_credential(&token, attempts);
            attempts += 1;
            cred
        });
    }
    callbacks
}

fn normalize_token(token: Option<&str>) -> Option<String> {
    token.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

fn token_credential(token: &str, attempt: usize) -> Result<Cred, git2::Error> {
    if attempt > 0 {
        return Err(git2::Error::from_str("GitHub rejected the access token"));
    }
    Cred::userpass_plaintext("x-access-token", token)
}

/// Branch and tag names advertised by the remote.
pub fn list_remote_references(url: &str, token: Option<&str>) -> Result<Vec<String>> {
    let mut remote = Remote::create_detached(url)?;
    let connection = remote
        .connect_auth(Direction::Fetch, Some(remote_callbacks(token)), None)
        .with_context(|| format!("Failed connecting to {url}"))?;
    let names = connection
        .list()?
        .iter()
        .filter_map(|head| {
            let name = head.name();
            name.strip_prefix("refs/heads/").or_else(|| name.strip_prefix("refs/tags/"))
        })
        .filter(|name| !name.ends_with("^{}"))
        .map(str::to_string)
        .collect();
    Ok(names)
}

/// Decide which reference to check out and which subpath to list.
///
/// The URL's `rest` is always split against the known references so the
/// subpath survives; an explicit reference only replaces the reference part.
pub fn resolve_target(
    explicit: Option<&str>,
    rest: Option<&str>,
    references: &[String],
) -> (Option<String>, Option<String>) {
    match rest {
        Some(rest) => {
            let (found, subpath) = split_reference(rest, references);
            (Some(explicit.map(str::to_string).unwrap_or(found)), subpath)
        }
        None => (explicit.map(str::to_string), None),
    }
}

/// Clone the repository behind `url` into a temporary directory.
///
/// Returns the working-copy context, the reference to list, and the subpath
/// the URL points into. An explicit `ref_` wins over one embedded in the URL.
pub fn clone_repository(
    url: &str,
    ref_: Option<&str>,
    token: Option<&str>,
) -> Result<(RepoContext, String, Option<String>)> {
    let parsed = parse_repo_url(url)?;
    let clone_url = parsed.clone_url();

    let references = match parsed.rest {
        Some(_) => list_remote_references(&clone_url, token)?,
        None => Vec::new(),
    };
    let (reference, subpath) = resolve_target(ref_, parsed.rest.as_deref(), &references);
    debug!("cloning {} at {:?} (subpath {:?})", clone_url, reference, subpath);

    let temp_dir = build_temp_repo_dir();
    std::fs::create_dir_all(&temp_dir)
        .with_context(|| format!("Failed creating temp directory: {}", temp_dir.display()))?;
    let context = RepoContext::temporary(temp_dir.clone(), parsed.repo.clone());

    let shallow = match &reference {
        Some(reference) => try_shallow_clone_with_branch(&clone_url, &temp_dir, reference, token),
        None => shallow_clone(&clone_url, &temp_dir, token),
    };
    if let Err(e) = shallow {
        debug!("shallow clone failed, falling back to full clone: {:#}", e);
        // A failed clone can leave a partial checkout behind.
        let _ = std::fs::remove_dir_all(&temp_dir);
        full_clone(&clone_url, &temp_dir, token)?;
    }

    Ok((context, reference.unwrap_or_else(|| "HEAD".to_string()), subpath))
}

fn fetch_options(token: Option<&str>, depth: Option<i32>) -> FetchOptions<'static> {
    let mut fo = FetchOptions::new();
    fo.remote_callbacks(remote_callbacks(token));
    if let Some(depth) = depth {
        fo.depth(depth);
    }
    fo
}

/// Attempt a shallow clone (depth=1) targeting a specific branch name.
fn try_shallow_clone_with_branch(
    url: &str,
    dest: &Path,
    branch: &str,
    token: Option<&str>,
) -> Result<Repository> {
    let mut builder = git2::build::RepoBuilder::new();
    builder.branch(branch);
    builder.fetch_options(fetch_options(token, Some(1)));

    builder.clone(url, dest).with_context(|| format!("Shallow clone with branch {branch} failed"))
}

/// Shallow clone (depth=1) the default branch.
fn shallow_clone(url: &str, dest: &Path, token: Option<&str>) -> Result<Repository> {
    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options(token, Some(1)));

    builder.clone(url, dest).with_context(|| format!("Shallow clone from {url} failed"))
}

fn full_clone(url: &str, dest: &Path, token: Option<&str>) -> Result<Repository> {
    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options(token, None));

    builder.clone(url, dest).with_context(|| format!("Failed cloning repository from {url}"))
}

fn build_temp_repo_dir() -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let pid = std::process::id();
    env::temp_dir().join(format!("repo2txt-{pid}-{nanos}"))
}
