//! Tree command implementation

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;

use super::utils::{annotate, load, SelectionArgs};
use crate::domain::{Annotation, ExtensionSummary, Generation};
use crate::render::{render_extension_summary, render_tree};
use crate::session::Session;
use crate::utils::format_with_commas;

#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Only expand directories up to this depth
    #[arg(long, value_name = "DEPTH")]
    pub depth: Option<usize>,

    /// Skip reading files for token counts
    #[arg(long)]
    pub no_tokens: bool,

    /// Print the selection and extension summaries as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SelectedEntry {
    path: String,
    annotation: Annotation,
}

#[derive(Serialize)]
struct TreeReport<'a> {
    name: &'a str,
    generation: Generation,
    total: Annotation,
    selected: Vec<SelectedEntry>,
    extensions: BTreeMap<String, ExtensionSummary>,
}

pub fn run(args: TreeArgs) -> Result<()> {
    let mut loaded = load(&args.selection)?;
    if !args.no_tokens {
        annotate(&mut loaded.session, &loaded.listing.content)?;
    }
    let session = &loaded.session;

    if args.json {
        let report = build_report(session, loaded.listing.name());
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", render_tree(session.tree(), loaded.listing.name(), args.depth));
    println!();
    println!("{}", render_extension_summary(&session.extension_summaries()));
    println!();

    let selected = session.selected_leaves().len();
    match root_aggregate(session) {
        Annotation::Value(tokens) => {
            println!("Selected: {} files, ~{} tokens", selected, format_with_commas(tokens))
        }
        Annotation::Loading => println!("Selected: {} files", selected),
        Annotation::Error => println!("Selected: {} files (some could not be read)", selected),
    }

    Ok(())
}

fn root_aggregate(session: &Session) -> Annotation {
    let tree = session.tree();
    tree.get(tree.root()).map(|root| root.annotation()).unwrap_or_default()
}

fn build_report<'a>(session: &Session, name: &'a str) -> TreeReport<'a> {
    let tree = session.tree();
    let selected = session
        .selected_leaves()
        .into_iter()
        .map(|leaf| {
            let annotation =
                tree.find(&leaf.path).and_then(|id| tree.get(id)).map(|n| n.annotation()).unwrap_or_default();
            SelectedEntry { path: leaf.path, annotation }
        })
        .collect();

    TreeReport {
        name,
        generation: session.generation(),
        total: root_aggregate(session),
        selected,
        extensions: session.extension_summaries(),
    }
}
