//! Merge-candidate scanner over registered lists.
//!
//! # Responsibility
//! - Score every unordered list pair by tag, title and item-title overlap.
//! - Report pairs above a threshold, best first.
//!
//! # Invariants
//! - `score(a, b) == score(b, a)` exactly; pairs are evaluated in slug order.
//! - Scores lie in `[0, 1]`.
//!
//! Content comparison is `O(n * m)` in the item counts of the two lists.

use crate::registry::Registry;
use crate::repo::item_repo::ItemRepository;
use log::warn;
use std::collections::BTreeSet;

pub const TAG_WEIGHT: f64 = 0.5;
pub const TITLE_WEIGHT: f64 = 0.3;
pub const CONTENT_WEIGHT: f64 = 0.2;

/// What the scanner knows about one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListProfile {
    pub slug: String,
    pub title: String,
    pub tags: BTreeSet<String>,
    /// Distinct item titles.
    pub item_titles: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub tag: f64,
    pub title: f64,
    pub content: f64,
}

impl ScoreBreakdown {
    pub fn weighted(&self) -> f64 {
        self.tag * TAG_WEIGHT + self.title * TITLE_WEIGHT + self.content * CONTENT_WEIGHT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeCandidate {
    /// Lexicographically smaller slug of the pair.
    pub first: String,
    pub second: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Scan result plus lists whose items could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub list_count: usize,
    pub candidates: Vec<MergeCandidate>,
    /// `(slug, error)` for lists scored with no items.
    pub unreadable: Vec<(String, String)>,
}

pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        _ => {
            let shared = a.intersection(b).count();
            let union = a.union(b).count();
            shared as f64 / union as f64
        }
    }
}

fn words(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn content_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let b_words: Vec<BTreeSet<String>> = b.iter().map(|title| words(title)).collect();
    let mut total = 0.0;
    for title in a {
        let a_words = words(title);
        for other in &b_words {
            total += jaccard(&a_words, other);
        }
    }
    total / (a.len() * b.len()) as f64
}

/// Component scores for one pair.
pub fn breakdown(a: &ListProfile, b: &ListProfile) -> ScoreBreakdown {
    let (a, b) = if a.slug <= b.slug { (a, b) } else { (b, a) };
    ScoreBreakdown {
        tag: jaccard(&a.tags, &b.tags),
        title: jaccard(&words(&a.title), &words(&b.title)),
        content: content_similarity(&a.item_titles, &b.item_titles),
    }
}

pub fn score(a: &ListProfile, b: &ListProfile) -> f64 {
    breakdown(a, b).weighted()
}

/// Every unordered pair with `score >= threshold`, highest score first; ties
/// ordered by slug.
pub fn scan(profiles: &[ListProfile], threshold: f64) -> Vec<MergeCandidate> {
    let mut candidates = Vec::new();
    for (index, a) in profiles.iter().enumerate() {
        for b in &profiles[index + 1..] {
            let parts = breakdown(a, b);
            let score = parts.weighted();
            if score >= threshold {
                let (first, second) = if a.slug <= b.slug { (a, b) } else { (b, a) };
                candidates.push(MergeCandidate {
                    first: first.slug.clone(),
                    second: second.slug.clone(),
                    score,
                    breakdown: parts,
                });
            }
        }
    }
    candidates.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| x.first.cmp(&y.first))
            .then_with(|| x.second.cmp(&y.second))
    });
    candidates
}

/// Builds profiles for every registered list.
///
/// A list whose file cannot be read is profiled with no items and reported
/// in the second return value.
pub fn load_profiles<I: ItemRepository>(
    registry: &Registry,
    items: &I,
) -> (Vec<ListProfile>, Vec<(String, String)>) {
    let mut profiles = Vec::with_capacity(registry.len());
    let mut unreadable = Vec::new();
    for entry in registry.list_all() {
        let item_titles = match items.load_items(entry) {
            Ok(loaded) => loaded.into_iter().map(|item| item.title).collect(),
            Err(err) => {
                warn!(
                    "event=profile_load module=similarity status=skip slug={} error_code={}",
                    entry.slug,
                    err.code()
                );
                unreadable.push((entry.slug.clone(), err.to_string()));
                BTreeSet::new()
            }
        };
        profiles.push(ListProfile {
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            tags: entry.tags.iter().cloned().collect(),
            item_titles,
        });
    }
    (profiles, unreadable)
}

/// Loads profiles and scans them in one step.
pub fn scan_registry<I: ItemRepository>(
    registry: &Registry,
    items: &I,
    threshold: f64,
) -> ScanReport {
    let (profiles, unreadable) = load_profiles(registry, items);
    ScanReport {
        list_count: profiles.len(),
        candidates: scan(&profiles, threshold),
        unreadable,
    }
}
