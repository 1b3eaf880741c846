//! Keyword filtering and title deduplication.
//!
//! Both steps preserve input order, so a run's output is deterministic for a
//! given provider response.

use crate::models::NewsItem;
use itertools::Itertools;

/// Lowercase terms; an item is kept if its title or snippet contains any of them.
pub const AI_ACT_TERMS: [&str; 6] = [
    "eu ai act",
    "ai act",
    "ki-gesetz",
    "ki verordnung",
    "ai-verordnung",
    "eu-ki-gesetz",
];

/// Upper bound on items in a snapshot.
pub const MAX_SNAPSHOT_ITEMS: usize = 20;

/// Whether `item` mentions the AI Act in its title or snippet.
pub fn mentions_ai_act(item: &NewsItem) -> bool {
    let text = format!("{} {}", item.title, item.snippet).to_lowercase();
    AI_ACT_TERMS.iter().any(|term| text.contains(term))
}

/// Keep only items mentioning the AI Act.
///
/// # Arguments
///
/// * `items` - Mapped provider results, in provider order
///
/// # Returns
///
/// The items for which [`mentions_ai_act`] holds, order preserved.
pub fn filter_ai_act(items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.into_iter().filter(mentions_ai_act).collect()
}

/// Dedup key for a title: trimmed, lowercased, inner whitespace collapsed.
pub fn title_key(title: &str) -> String {
    title.split_whitespace().join(" ").to_lowercase()
}

/// Drop untitled items and repeated titles, then cap at [`MAX_SNAPSHOT_ITEMS`].
///
/// The first occurrence of a title wins. Stored items keep their original title.
///
/// # Arguments
///
/// * `items` - Filtered items, in provider order
///
/// # Returns
///
/// At most [`MAX_SNAPSHOT_ITEMS`] items with distinct, non-blank [`title_key`]s.
pub fn dedup_and_cap(items: Vec<NewsItem>) -> Vec<NewsItem> {
    items
        .into_iter()
        .filter(|it| !it.title.trim().is_empty())
        .unique_by(|it| title_key(&it.title))
        .take(MAX_SNAPSHOT_ITEMS)
        .collect()
}
