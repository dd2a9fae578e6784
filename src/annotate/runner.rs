//! Parallel annotation fetch.
//!
//! Content reads and token estimation run on the rayon pool; each result is
//! sent back as an [`AnnotationMessage`] for the owning [`Session`] to apply.
//! Completion order is unspecified.
//!
//! [`Session`]: crate::session::Session

use crate::domain::{AnnotationResult, Generation, NodeId};
use crate::fetch::ContentSource;
use crate::utils::estimate_tokens;
use rayon::prelude::*;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AnnotationJob {
    pub leaf: NodeId,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationMessage {
    pub leaf: NodeId,
    pub generation: Generation,
    pub result: AnnotationResult,
}

/// Start annotating `jobs` in the background.
///
/// The receiver yields exactly one message per job and disconnects when all
/// jobs are done.
pub fn spawn(
    source: ContentSource,
    jobs: Vec<AnnotationJob>,
    generation: Generation,
) -> (Receiver<AnnotationMessage>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        jobs.into_par_iter().for_each_init(
            || (source.open(), tx.clone()),
            |(reader, tx), job| {
                let result = match reader {
                    Ok(reader) => match reader.read(&job.url) {
                        Ok(text) => AnnotationResult::Value(estimate_tokens(&text)),
                        Err(e) => {
                            warn!("Failed to annotate {}: {:#}", job.path, e);
                            AnnotationResult::Error
                        }
                    },
                    Err(e) => {
                        warn!("Failed to open content source for {}: {:#}", job.path, e);
                        AnnotationResult::Error
                    }
                };
                // Receiver gone means the caller moved on; nothing left to do.
                let _ = tx.send(AnnotationMessage { leaf: job.leaf, generation, result });
            },
        );
    });
    (rx, handle)
}
