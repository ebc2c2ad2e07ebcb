//! Keyword-frequency extraction
//!
//! A pure, stateless tokenizer that turns raw document text into the top-N
//! keywords by frequency. The layout core only consumes the resulting keyword
//! *set*; the counts are kept for frequency reporting.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of keyword to frequency, most frequent first
pub type KeywordCounts = IndexMap<String, usize>;

/// Words ignored by the default extractor
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "this", "that", "with", "from", "have", "were", "there", "their", "been", "about", "which",
    "also", "some", "will", "into", "your", "the", "and", "for", "are", "was", "you", "but", "not",
    "can", "all", "any", "has", "they",
];

/// Tuning for keyword extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordOptions {
    /// Tokens must be strictly longer than this many characters
    pub min_length: usize,

    /// Number of keywords kept per document
    pub top_n: usize,

    /// Words that are never keywords (compared after lowercasing)
    pub stopwords: Vec<String>,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self {
            min_length: 3,
            top_n: 15,
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl KeywordOptions {
    /// Extract keywords from `text` using these options
    pub fn extract(&self, text: &str) -> KeywordCounts {
        let stopwords: HashSet<&str> = self.stopwords.iter().map(String::as_str).collect();
        extract_keywords(text, &stopwords, self.min_length, self.top_n)
    }
}

/// Extract the `top_n` most frequent keywords from `text`.
///
/// Text is split on every character that is neither alphanumeric nor `_`,
/// lowercased, and filtered to tokens longer than `min_length` that are not
/// stopwords. Ties in frequency keep the order in which the keywords first
/// appeared.
pub fn extract_keywords(
    text: &str,
    stopwords: &HashSet<&str>,
    min_length: usize,
    top_n: usize,
) -> KeywordCounts {
    let mut counts = KeywordCounts::new();

    for token in text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
    {
        let word = token.to_lowercase();
        if word.chars().count() <= min_length || stopwords.contains(word.as_str()) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    // Stable sort: equal counts stay in first-seen order
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts.truncate(top_n);
    counts
}

/// The keywords extracted from one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordProfile {
    /// Document identifier (e.g., the file name)
    pub id: String,

    /// Top keywords with their frequencies, most frequent first
    pub keywords: KeywordCounts,
}

impl KeywordProfile {
    /// Create a profile from already-extracted keywords
    pub fn new(id: impl Into<String>, keywords: KeywordCounts) -> Self {
        Self {
            id: id.into(),
            keywords,
        }
    }

    /// Extract a profile from raw document text
    pub fn from_text(id: impl Into<String>, text: &str, options: &KeywordOptions) -> Self {
        Self::new(id, options.extract(text))
    }

    /// Build a profile from a plain keyword list; every keyword counts once
    pub fn from_keywords<I, S>(id: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts = KeywordCounts::new();
        for keyword in keywords {
            *counts.entry(keyword.into()).or_insert(0) += 1;
        }
        Self::new(id, counts)
    }

    /// The keyword set consumed by the graph builder
    pub fn keyword_set(&self) -> BTreeSet<String> {
        self.keywords.keys().cloned().collect()
    }
}

/// Sum keyword frequencies across a set of profiles.
///
/// The result is ordered by descending total, ties in first-seen order.
pub fn merge_counts<'a, I>(profiles: I) -> KeywordCounts
where
    I: IntoIterator<Item = &'a KeywordProfile>,
{
    let mut totals = KeywordCounts::new();
    for profile in profiles {
        for (keyword, count) in &profile.keywords {
            *totals.entry(keyword.clone()).or_insert(0) += count;
        }
    }
    totals.sort_by(|_, a, _, b| b.cmp(a));
    totals
}

/// Keyword groups keyed by the first keyword of each group
pub type KeywordClusters = IndexMap<String, Vec<String>>;

/// Whether two keywords look like variants of the same word.
///
/// Their lengths may differ by at most 3, and their common prefix must cover
/// at least half of the shorter one (rounded down).
pub fn are_similar(a: &str, b: &str) -> bool {
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a.abs_diff(len_b) > 3 {
        return false;
    }
    let prefix = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count();
    prefix >= len_a.min(len_b) / 2
}

/// Group keywords into clusters of similar words.
///
/// Keywords are visited in the order of `counts`. Each joins the first
/// existing cluster whose key it is similar to, or opens a new cluster keyed
/// by itself.
pub fn cluster_keywords(counts: &KeywordCounts) -> KeywordClusters {
    let mut clusters = KeywordClusters::new();
    for word in counts.keys() {
        match clusters.iter_mut().find(|(key, _)| are_similar(word, key)) {
            Some((_, members)) => members.push(word.clone()),
            None => {
                clusters.insert(word.clone(), vec![word.clone()]);
            }
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_stopwords() -> HashSet<&'static str> {
        HashSet::new()
    }

    #[test]
    fn empty_text_yields_no_keywords() {
        let counts = extract_keywords("", &no_stopwords(), 3, 10);
        assert!(counts.is_empty());
    }

    #[test]
    fn counts_are_lowercased_and_sorted_by_frequency() {
        let counts = extract_keywords(
            "Graph layout. GRAPH physics, graph layout!",
            &no_stopwords(),
            3,
            10,
        );
        let ranked: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(ranked, vec![("graph", 3), ("layout", 2), ("physics", 1)]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let counts = extract_keywords("zeta alpha mango alpha zeta mango", &no_stopwords(), 3, 10);
        let order: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["zeta", "alpha", "mango"]);
    }

    #[test]
    fn short_tokens_and_stopwords_are_dropped() {
        let stopwords: HashSet<&str> = ["their"].into_iter().collect();
        let counts = extract_keywords("the cat sat with their kittens", &stopwords, 3, 10);
        let order: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["with", "kittens"]);
    }

    #[test]
    fn output_is_truncated_to_top_n() {
        let counts = extract_keywords(
            "apple apple apple berry berry cherry",
            &no_stopwords(),
            3,
            2,
        );
        assert_eq!(counts.len(), 2);
        assert!(!counts.contains_key("cherry"));
    }

    #[test]
    fn punctuation_and_digits_split_like_word_boundaries() {
        let counts = extract_keywords("node-link/force_directed v2.0", &no_stopwords(), 3, 10);
        let order: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["node", "link", "force_directed"]);
    }

    #[test]
    fn default_options_filter_default_stopwords() {
        let options = KeywordOptions::default();
        let counts = options.extract("about which there their documents documents");
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("documents"), Some(&2));
    }

    #[test]
    fn profile_keyword_set_ignores_counts() {
        let profile = KeywordProfile::from_keywords("a.txt", ["beta", "alpha", "beta"]);
        let set: Vec<String> = profile.keyword_set().into_iter().collect();
        assert_eq!(set, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(profile.keywords.get("beta"), Some(&2));
    }

    #[test]
    fn merge_counts_sums_across_profiles() {
        let a = KeywordProfile::new(
            "a",
            [("graph".to_string(), 2), ("node".to_string(), 1)]
                .into_iter()
                .collect(),
        );
        let b = KeywordProfile::new(
            "b",
            [("node".to_string(), 4), ("edge".to_string(), 1)]
                .into_iter()
                .collect(),
        );
        let totals = merge_counts([&a, &b]);
        let ranked: Vec<(&str, usize)> = totals.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(ranked, vec![("node", 5), ("graph", 2), ("edge", 1)]);
    }

    #[test]
    fn similar_words_share_half_the_shorter_prefix() {
        assert!(are_similar("graph", "graphs"));
        assert!(are_similar("layout", "layer"));
        // shorter length 4, half is 2: "no" is enough
        assert!(are_similar("node", "noted"));
        assert!(!are_similar("node", "nice"));
        assert!(!are_similar("edge", "graph"));
    }

    #[test]
    fn similar_words_differ_in_length_by_at_most_three() {
        assert!(are_similar("form", "formats"));
        assert!(!are_similar("form", "formatted"));
    }

    #[test]
    fn clusters_keep_first_seen_order() {
        let counts: KeywordCounts = [
            ("graph", 4),
            ("layout", 3),
            ("graphs", 2),
            ("poetry", 2),
            ("layouts", 1),
            ("graphing", 1),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let clusters = cluster_keywords(&counts);
        let keys: Vec<&str> = clusters.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["graph", "layout", "poetry"]);
        assert_eq!(clusters["graph"], vec!["graph", "graphs", "graphing"]);
        assert_eq!(clusters["layout"], vec!["layout", "layouts"]);
        assert_eq!(clusters["poetry"], vec!["poetry"]);
    }

    #[test]
    fn clusters_of_merged_corpus() {
        let a = KeywordProfile::from_keywords("a", ["compiler", "memory"]);
        let b = KeywordProfile::from_keywords("b", ["compilers", "memory", "sonnet"]);
        let clusters = cluster_keywords(&merge_counts([&a, &b]));

        assert_eq!(clusters["memory"], vec!["memory"]);
        assert_eq!(clusters["compiler"], vec!["compiler", "compilers"]);
        assert_eq!(clusters.len(), 3);
        assert!(cluster_keywords(&KeywordCounts::new()).is_empty());
    }
}
