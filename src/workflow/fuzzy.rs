//! Fuzzy matching oracle: a keyword predicate and an item ranker.
//!
//! Both sides use frizbee's Smith-Waterman scoring with no typo budget, so a
//! candidate matches when every query char appears in it in order. Ranking is
//! a stable sort on that score, so ties keep their accumulation order and
//! repeated runs produce identical lists.

use std::cmp::Reverse;

use frizbee::Config;

use super::items::Item;

pub trait Matcher {
    /// Does `candidate` fuzzily match `query`?
    fn matches(&self, candidate: &str, query: &str) -> bool;

    /// Reorder `items` by relevance to `query`.
    fn rank(&self, items: &mut Vec<Item>, query: &str);
}

/// Case-insensitive fuzzy matching backed by frizbee.
#[derive(Debug, Default, Clone, Copy)]
pub struct FuzzyMatcher;

fn config() -> Config {
    Config {
        max_typos: Some(0),
        ..Config::default()
    }
}

/// Score of each haystack against `query`; `None` where it does not match.
fn scores(query: &str, haystacks: &[String]) -> Vec<Option<u32>> {
    let mut out = vec![None; haystacks.len()];
    for m in frizbee::match_list(query, haystacks, &config()) {
        if let Some(slot) = out.get_mut(m.index as usize) {
            *slot = Some(m.score as u32);
        }
    }
    out
}

impl Matcher for FuzzyMatcher {
    fn matches(&self, candidate: &str, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        scores(&query, &[candidate.to_lowercase()])[0].is_some()
    }

    fn rank(&self, items: &mut Vec<Item>, query: &str) {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return;
        }
        let titles: Vec<String> = items.iter().map(|i| i.title.to_lowercase()).collect();
        let mut scored: Vec<(Option<u32>, Item)> =
            scores(&query, &titles).into_iter().zip(items.drain(..)).collect();
        scored.sort_by_key(|(score, _)| Reverse(*score));
        items.extend(scored.into_iter().map(|(_, item)| item));
    }
}
