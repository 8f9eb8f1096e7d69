//! Deterministic summary fallback.
//!
//! Keyword themes, canned recommendations and a naive extractive summary.
//! Nothing in here can fail; it is what the orchestrator serves whenever the
//! generation service cannot.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use super::models::{StructuredSummary, Theme};

pub const MAX_THEMES: usize = 10;
pub const RECOMMENDATION_COUNT: usize = 3;
/// Only this many top themes are matched against topics.
const TOPIC_THEMES: usize = 5;
const SUMMARY_SENTENCES: usize = 3;
const MIN_TOKEN_CHARS: usize = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "to", "a", "of", "in", "is", "for", "on", "we", "i", "it", "with", "that",
    "this", "are", "be", "as", "was", "but", "have", "has",
];

pub const PADDING_RECOMMENDATION: &str =
    "Engage the community with a public workshop to prioritize short-term and long-term interventions.";

struct Topic {
    pattern: Regex,
    recommendation: &'static str,
}

impl Topic {
    fn new(pattern: &str, recommendation: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            recommendation,
        }
    }
}

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]\s+").unwrap();

    /// Checked in order; a theme belongs to the first topic it matches.
    static ref TOPICS: Vec<Topic> = vec![
        Topic::new(
            r"^parks?$|tree|bench|streetscape|green",
            "Invest in greenspace and street furniture (trees, benches) to improve neighborhood livability.",
        ),
        Topic::new(
            r"parking",
            "Introduce targeted parking management: time-limited parking, dedicated loading zones, and enforcement to reduce circling.",
        ),
        Topic::new(
            r"traffic|through|speed",
            "Pilot traffic calming measures (e.g., curb extensions, raised crosswalks, speed cushions) to reduce through-traffic and improve safety.",
        ),
        Topic::new(
            r"light|safe",
            "Improve street lighting and sightlines on poorly lit corridors to increase nighttime safety.",
        ),
        Topic::new(
            r"bike|bicycl|^cycl",
            "Create and enforce protected bike lanes and add bike parking to encourage cycling and reduce short car trips.",
        ),
        Topic::new(
            r"^bus(es)?$|transit|route",
            "Increase transit frequency on the affected routes and improve stop amenities to encourage public transport use.",
        ),
    ];
}

fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_ALPHANUMERIC.replace_all(&lowered, " ");
    let tokens = cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect();
    tokens
}

/// Top keywords by frequency; ties keep first-seen order
pub fn extract_themes<S: AsRef<str>>(comments: &[S]) -> Vec<Theme> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for comment in comments {
        for token in tokenize(comment.as_ref()) {
            let count = counts.entry(token.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(token);
            }
            *count += 1;
        }
    }

    let mut themes: Vec<Theme> = first_seen
        .into_iter()
        .map(|theme| {
            let count = counts[&theme];
            Theme { theme, count }
        })
        .collect();

    // stable sort keeps first-seen order among equal counts
    themes.sort_by(|a, b| b.count.cmp(&a.count));
    themes.truncate(MAX_THEMES);
    themes
}

/// Exactly three recommendations: one per matched topic, then padding
pub fn recommend(themes: &[Theme]) -> Vec<String> {
    let mut used: HashSet<usize> = HashSet::new();
    let mut recommendations: Vec<String> = Vec::with_capacity(RECOMMENDATION_COUNT);

    for theme in themes.iter().take(TOPIC_THEMES) {
        if recommendations.len() >= RECOMMENDATION_COUNT {
            break;
        }

        let matched = TOPICS
            .iter()
            .position(|topic| topic.pattern.is_match(&theme.theme));

        if let Some(index) = matched {
            if used.insert(index) {
                recommendations.push(TOPICS[index].recommendation.to_string());
            }
        }
    }

    while recommendations.len() < RECOMMENDATION_COUNT {
        recommendations.push(PADDING_RECOMMENDATION.to_string());
    }

    recommendations
}

/// First three sentences of the joined comments
pub fn extractive_summary<S: AsRef<str>>(comments: &[S]) -> String {
    let joined = comments
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");

    let sentences: Vec<&str> = SENTENCE_BREAK
        .split(&joined)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut summary = sentences
        .iter()
        .take(SUMMARY_SENTENCES)
        .copied()
        .collect::<Vec<_>>()
        .join(". ");

    if sentences.len() > SUMMARY_SENTENCES {
        summary.push('.');
    }

    summary
}

/// Full structured fallback for a non-empty comment list
///
/// The summary is never empty: if the comments carry no words at all,
/// a generic line naming the comment count is used instead.
pub fn heuristic_summary<S: AsRef<str>>(comments: &[S], top_k: usize) -> StructuredSummary {
    let themes = extract_themes(comments);
    let recommendations = recommend(&themes);

    let mut summary = extractive_summary(comments);
    if !summary.chars().any(char::is_alphanumeric) {
        summary = format!(
            "Residents have left {} comment{} about this lot.",
            comments.len(),
            if comments.len() == 1 { "" } else { "s" }
        );
    }

    let representative_comments = comments
        .iter()
        .take(top_k)
        .map(|c| c.as_ref().to_string())
        .collect();

    StructuredSummary {
        summary,
        recommendations,
        themes,
        representative_comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(name: &str, count: u32) -> Theme {
        Theme {
            theme: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_themes_drop_stopwords_and_short_tokens() {
        let themes = extract_themes(&[
            "The park is on the corner, and we love it!",
            "A park with trees. Go go go",
        ]);

        let names: Vec<&str> = themes.iter().map(|t| t.theme.as_str()).collect();
        assert_eq!(names[0], "park");
        assert_eq!(themes[0].count, 2);
        for name in &names {
            assert!(name.chars().count() >= 3);
            assert!(!STOPWORDS.contains(name));
        }
        assert!(!names.contains(&"go"));
        assert!(!names.contains(&"the"));
    }

    #[test]
    fn test_theme_ties_keep_first_seen_order() {
        let themes = extract_themes(&["garden mural garden mural bench"]);
        assert_eq!(
            themes,
            vec![theme("garden", 2), theme("mural", 2), theme("bench", 1)]
        );
    }

    #[test]
    fn test_themes_capped_at_ten() {
        let text = (0..15)
            .map(|i| format!("word{:02}", i))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(extract_themes(&[text]).len(), MAX_THEMES);
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let themes = extract_themes(&["bike-lane"]);
        let names: Vec<&str> = themes.iter().map(|t| t.theme.as_str()).collect();
        assert_eq!(names, vec!["bike", "lane"]);
    }

    #[test]
    fn test_recommendations_one_per_topic_then_padding() {
        let recs = recommend(&[theme("trees", 3), theme("park", 2), theme("parking", 1)]);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Invest in greenspace"));
        assert!(recs[1].starts_with("Introduce targeted parking"));
        assert_eq!(recs[2], PADDING_RECOMMENDATION);
    }

    #[test]
    fn test_parking_does_not_land_in_greenspace() {
        let recs = recommend(&[theme("parking", 4)]);
        assert!(recs[0].starts_with("Introduce targeted parking"));
    }

    #[test]
    fn test_business_is_not_transit() {
        let recs = recommend(&[theme("business", 4), theme("buses", 2)]);
        assert!(recs[0].starts_with("Increase transit frequency"));
        assert_eq!(recs[1], PADDING_RECOMMENDATION);
    }

    #[test]
    fn test_only_top_five_themes_considered() {
        let themes = vec![
            theme("mural", 9),
            theme("garden", 8),
            theme("art", 7),
            theme("music", 6),
            theme("food", 5),
            theme("traffic", 4),
        ];
        let recs = recommend(&themes);
        // "garden" is not a greenspace keyword on its own, "traffic" is sixth
        assert!(recs.iter().all(|r| r == PADDING_RECOMMENDATION));
    }

    #[test]
    fn test_always_exactly_three() {
        assert_eq!(recommend(&[]).len(), 3);
        let many = vec![
            theme("speed", 5),
            theme("lighting", 4),
            theme("bikes", 3),
            theme("transit", 2),
            theme("trees", 1),
        ];
        let recs = recommend(&many);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Pilot traffic calming"));
        assert!(recs[1].starts_with("Improve street lighting"));
        assert!(recs[2].starts_with("Create and enforce protected bike"));
    }

    #[test]
    fn test_extractive_summary_takes_three_sentences() {
        let summary = extractive_summary(&[
            "We need a playground. Kids have nowhere to go!",
            "Please add lights? It is dark. Really dark.",
        ]);
        assert_eq!(
            summary,
            "We need a playground. Kids have nowhere to go. Please add lights."
        );
    }

    #[test]
    fn test_extractive_summary_short_input_unchanged() {
        assert_eq!(extractive_summary(&["More trees please"]), "More trees please");
    }

    #[test]
    fn test_heuristic_summary_never_empty() {
        let fallback = heuristic_summary(&["!!!", "..."], 3);
        assert!(!fallback.summary.trim().is_empty());
        assert_eq!(fallback.recommendations.len(), 3);
        assert_eq!(fallback.representative_comments.len(), 2);
    }
}
