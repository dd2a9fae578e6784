//! Export command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use super::utils::{load, SelectionArgs};
use crate::fetch::read_all;
use crate::render::{format_repo_contents, write_archive};
use crate::utils::{estimate_tokens, format_with_commas};

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Directory for the output file
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name (default: <repo>_prompt.txt, or <repo>.zip with --zip)
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Write the export to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Write the selected files into a ZIP archive instead of one text file
    #[arg(long, conflicts_with = "stdout")]
    pub zip: bool,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let start_time = Instant::now();

    let loaded = load(&args.selection)?;
    let selected = loaded.session.selected_leaves();
    if selected.is_empty() {
        anyhow::bail!("No files selected. Use --select or --include-ext to pick files to export");
    }

    let contents = read_all(&loaded.listing.content, &selected);
    let failed = contents.iter().filter(|c| c.error).count();

    let output_dir = args
        .output_dir
        .or_else(|| loaded.config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let default_name = if args.zip {
        format!("{}.zip", loaded.listing.name())
    } else {
        format!("{}_prompt.txt", loaded.listing.name())
    };
    let output_path = output_dir.join(args.output_file.unwrap_or_else(|| PathBuf::from(default_name)));

    if args.zip {
        create_parent(&output_path)?;
        let file = fs::File::create(&output_path)
            .with_context(|| format!("Failed creating archive: {}", output_path.display()))?;
        let entries = write_archive(file, &contents)?;
        info!("wrote {} entries to {}", entries, output_path.display());

        println!();
        println!("Export complete!");
        println!();
        println!("Statistics:");
        println!("  Repository:      {}", loaded.listing.name());
        println!("  Files archived:  {}", entries);
        if failed > 0 {
            println!("  Files skipped:   {}", failed);
        }
        println!("  Output:          {}", output_path.display());
        println!("  Time:            {:.2}s", start_time.elapsed().as_secs_f64());
        return Ok(());
    }

    let output = format_repo_contents(&contents);
    let tokens = estimate_tokens(&output);

    if args.stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        eprintln!(
            "Exported {} files (~{} tokens)",
            contents.len(),
            format_with_commas(tokens)
        );
        return Ok(());
    }

    create_parent(&output_path)?;
    fs::write(&output_path, &output)
        .with_context(|| format!("Failed writing output file: {}", output_path.display()))?;

    println!();
    println!("Export complete!");
    println!();
    println!("Statistics:");
    println!("  Repository:      {}", loaded.listing.name());
    println!("  Files exported:  {}", contents.len());
    if failed > 0 {
        println!("  Files failed:    {}", failed);
    }
    println!("  Approx. tokens:  {}", format_with_commas(tokens));
    println!("  Output:          {}", output_path.display());
    println!("  Time:            {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating output directory: {}", parent.display()))?;
    }
    Ok(())
}
