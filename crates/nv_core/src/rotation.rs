//! Rotation over a batch of candidate articles.
//!
//! Each invocation loads the set of already processed identifiers, picks one
//! candidate that is not in it, and appends that candidate once its image is
//! stored. When every candidate of the batch has been seen the set is reset
//! and the rotation starts over.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Article, ProcessedSet};
use crate::{Error, Result};

/// Outcome of [`select_next`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Next(&'a Article),
    /// Every candidate is already processed.
    Exhausted,
}

/// Pick one candidate uniformly at random among those not yet processed.
pub fn select_next<'a, R>(candidates: &'a [Article], processed: &ProcessedSet, rng: &mut R) -> Selection<'a>
where
    R: Rng + ?Sized,
{
    let remaining: Vec<&Article> = candidates
        .iter()
        .filter(|article| !processed.contains(article.id()))
        .collect();

    match remaining.choose(rng) {
        Some(&article) => Selection::Next(article),
        None => Selection::Exhausted,
    }
}

/// Append `article` to the processed set.
pub fn record_processed(mut processed: ProcessedSet, article: &Article) -> Result<ProcessedSet> {
    if processed.contains(article.id()) {
        return Err(Error::DuplicateIdentifier(article.id().to_string()));
    }
    processed.push(article.id().to_string());
    Ok(processed)
}

pub fn reset() -> ProcessedSet {
    ProcessedSet::new()
}
