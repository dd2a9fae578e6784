//! Shared CLI utilities: source/selection arguments and the load pipeline.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::annotate::runner::{self, AnnotationJob};
use crate::annotate::Resolution;
use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{normalize_extension, Config};
use crate::fetch::{fetch_listing, ContentSource, Listing};
use crate::select::ToggleOutcome;
use crate::session::Session;

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Local directory path to load
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// GitHub repository URL (https://github.com/owner/repo[/tree/ref/path])
    #[arg(short = 'r', long, value_name = "URL")]
    pub repo: Option<String>,

    /// Git ref (branch/tag/SHA) to list instead of the working tree
    #[arg(long = "ref", value_name = "REF")]
    pub ref_: Option<String>,

    /// GitHub access token for private repositories
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to config file (repo2txt.toml or .repo2txt.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extensions selected after loading (comma-separated, replaces the configured defaults)
    #[arg(short = 'i', long, value_name = "EXTS")]
    pub include_ext: Option<String>,

    /// Extensions deselected after the defaults are applied (comma-separated)
    #[arg(long, value_name = "EXTS")]
    pub exclude_ext: Option<String>,

    /// Leave out paths matching these globs when walking a directory (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude_glob: Option<String>,

    /// Files larger than this (bytes) are listed but not read
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,

    /// Ignore .gitignore rules
    #[arg(long)]
    pub no_gitignore: bool,

    /// Select these files or directories (repeatable or comma-separated)
    #[arg(long, value_name = "PATHS", value_delimiter = ',', num_args = 1..)]
    pub select: Vec<String>,

    /// Deselect these files or directories (repeatable or comma-separated)
    #[arg(long, value_name = "PATHS", value_delimiter = ',', num_args = 1..)]
    pub deselect: Vec<String>,

    /// Start with nothing selected instead of the default extensions
    #[arg(long)]
    pub no_default_selection: bool,
}

/// A loaded listing and the session built from it.
pub struct Loaded {
    pub listing: Listing,
    pub session: Session,
    pub config: Config,
}

/// Load config, fetch the listing, build the session and apply the selection.
pub fn load(args: &SelectionArgs) -> Result<Loaded> {
    if args.path.is_some() && args.repo.is_some() {
        anyhow::bail!("Cannot specify both --path and --repo");
    }
    if args.path.is_none() && args.repo.is_none() {
        anyhow::bail!("Either --path or --repo must be specified");
    }

    let config_root = match &args.path {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    let file_config = load_config(&config_root, args.config.as_deref())?;
    let overrides = CliOverrides {
        default_extensions: parse_csv(&args.include_ext),
        exclude_globs: parse_csv(&args.exclude_glob),
        no_gitignore: args.no_gitignore,
        max_file_bytes: args.max_file_bytes,
        output_dir: None,
    };
    let config = merge_cli_with_config(file_config, &overrides);
    debug!("effective config: {:?}", config);

    let listing = fetch_listing(
        args.path.as_deref(),
        args.repo.as_deref(),
        args.ref_.as_deref(),
        args.token.as_deref(),
        &config,
    )?;
    info!("listed {} entries from {}", listing.entries.len(), listing.name());

    let mut session = Session::new();
    session.load(&listing.entries).context("Failed to build the repository tree")?;
    apply_selection(&mut session, args, &config)?;

    Ok(Loaded { listing, session, config })
}

/// Default extensions first, then `--exclude-ext`, then explicit paths.
pub fn apply_selection(session: &mut Session, args: &SelectionArgs, config: &Config) -> Result<()> {
    if !args.no_default_selection {
        for ext in &config.default_extensions {
            if session.extensions().contains(ext) {
                let _ = session.toggle_extension(ext, true);
            }
        }
    }

    for ext in parse_csv(&args.exclude_ext).unwrap_or_default() {
        let ext = normalize_extension(&ext);
        if session.extensions().contains(&ext) {
            let _ = session.toggle_extension(&ext, false);
        }
    }

    for (paths, checked) in [(&args.select, true), (&args.deselect, false)] {
        for path in paths {
            if session.toggle_path(path, checked) != ToggleOutcome::Applied {
                anyhow::bail!("Path not found in repository: {path}");
            }
        }
    }

    // Selection notifications only matter to interactive front ends.
    session.drain_changes();
    Ok(())
}

/// Annotate every pending leaf with its token estimate, blocking until done.
pub fn annotate(session: &mut Session, source: &ContentSource) -> Result<()> {
    let jobs: Vec<AnnotationJob> = session
        .pending_annotations()
        .into_iter()
        .map(|(leaf, path, url)| AnnotationJob { leaf, path, url })
        .collect();
    if jobs.is_empty() {
        return Ok(());
    }

    let progress = if std::io::stderr().is_terminal() {
        ProgressBar::new(jobs.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::default_bar().template("{spinner} Counting tokens [{bar:30}] {pos}/{len}")?,
    );

    let (rx, handle) = runner::spawn(source.clone(), jobs, session.generation());
    for message in rx {
        if session.resolve_annotation(message.leaf, message.generation, message.result)
            != Resolution::Applied
        {
            debug!("dropped annotation for {:?}", message.leaf);
        }
        progress.inc(1);
    }
    handle.join().map_err(|_| anyhow::anyhow!("annotation worker panicked"))?;
    progress.finish_and_clear();
    session.drain_changes();
    Ok(())
}
