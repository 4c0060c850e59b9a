//! Pattern-based extraction strategies.
//!
//! Each strategy looks for one linguistic cue and runs over the whole text
//! on its own. The same place may be reported by several strategies; the
//! deduplicator folds those together later.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::filters::{clean_location_name, is_valid_location_name};
use crate::gazetteer::NATURE_LANDMARKS;
use crate::schema::{CandidateMention, ContextTag};

/// A single extraction strategy.
pub trait MentionExtractor: Send + Sync {
    fn context(&self) -> ContextTag;

    fn extract(&self, text: &str) -> Vec<CandidateMention>;
}

/// The six strategies in their fixed run order.
pub fn default_strategies() -> Vec<Box<dyn MentionExtractor>> {
    vec![
        Box::new(RecommendationExtractor),
        Box::new(DescriptiveExtractor),
        Box::new(BusinessExtractor),
        Box::new(QuotedExtractor),
        Box::new(NatureExtractor),
        Box::new(ListExtractor),
    ]
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid extraction pattern {pattern}: {e}"))
}

/// Run each pattern and keep capture group 1 of every match.
fn captures<'t>(patterns: &[Regex], text: &'t str) -> Vec<&'t str> {
    patterns
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Clean, filter and tag raw captures.
fn to_mentions<'t>(
    raws: impl IntoIterator<Item = &'t str>,
    context: ContextTag,
) -> Vec<CandidateMention> {
    raws.into_iter()
        .filter_map(|raw| {
            let cleaned = clean_location_name(raw);
            is_valid_location_name(&cleaned).then(|| CandidateMention::new(raw, cleaned, context))
        })
        .collect()
}

fn phrase_len_ok(phrase: &str) -> bool {
    (5..=40).contains(&phrase.chars().count())
}

// Recommendation: "check out X", "head to X", "recommend X"

static RECOMMENDATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let terminator = r"(?:\s+(?i:is|was|has|for|and|but|or|with)\b|\s*[.,!?;:()]|\s*\n|\s*$)";
    vec![
        compile(&format!(
            r"\b(?i:go to|visit|check out|try|head to|stop by|been to)\s+(?:(?i:the)\s+)?([A-Z][A-Za-z ]{{4,39}}?){terminator}"
        )),
        compile(&format!(
            r"\b(?i:recommend|suggest|love)\s+(?:(?i:the)\s+)?([A-Z][A-Za-z ]{{4,39}}?){terminator}"
        )),
    ]
});

pub struct RecommendationExtractor;

impl MentionExtractor for RecommendationExtractor {
    fn context(&self) -> ContextTag {
        ContextTag::Recommendation
    }

    fn extract(&self, text: &str) -> Vec<CandidateMention> {
        to_mentions(captures(&RECOMMENDATION_PATTERNS, text), self.context())
    }
}

// Descriptive: "X is great", "X has amazing", "X offers stunning"

static DESCRIPTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b([A-Z][A-Za-z'-]*(?:[ \t]+[A-Z][A-Za-z'-]*)*)\s+(?i:is|has|offers)\s+(?i:great|amazing|awesome|beautiful|perfect|nice|good|worth|recommended|incredible|fantastic|wonderful|excellent|stunning)\b",
    )
});

pub struct DescriptiveExtractor;

impl MentionExtractor for DescriptiveExtractor {
    fn context(&self) -> ContextTag {
        ContextTag::Descriptive
    }

    fn extract(&self, text: &str) -> Vec<CandidateMention> {
        let raws = DESCRIPTIVE_PATTERN
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .filter(|phrase| phrase_len_ok(phrase));
        to_mentions(raws, self.context())
    }
}

// Business: multi-word names ending in a venue noun

static BUSINESS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(
            r"\b([A-Z][a-z]{2,}\s+[A-Z][a-z]{2,}\s+[A-Z][a-z]{2,}\s+(?:Club|Center|Resort|Lodge|Restaurant|Cafe|Bar|Grill|Course|Clubhouse))\b",
        ),
        compile(
            r"\b([A-Z][a-z]{2,}\s+[A-Z][a-z]{2,}\s+(?:Capital|Golf|Country|Sports|Recreation|Tennis|Athletic)\s+Club)\b",
        ),
        compile(r"\b([A-Z][a-z]{2,}\s+(?:Golf|Country|Sports|Athletic|Tennis|Recreation)\s+Club)\b"),
        compile(
            r"\b([A-Z][a-z]{2,}\s+[A-Z][a-z]{2,}\s+(?:Restaurant|Cafe|Bar|Grill|Course|Resort|Lodge|Center))\b",
        ),
    ]
});

pub struct BusinessExtractor;

impl MentionExtractor for BusinessExtractor {
    fn context(&self) -> ContextTag {
        ContextTag::Business
    }

    fn extract(&self, text: &str) -> Vec<CandidateMention> {
        to_mentions(captures(&BUSINESS_PATTERNS, text), self.context())
    }
}

// Quoted: "X", 'X', *X*, `X`

static QUOTED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r#""([A-Z][^"\n]{4,39})""#),
        compile(r"“([A-Z][^”\n]{4,39})”"),
        compile(r"'([A-Z][^'\n]{4,39})'"),
        compile(r"\*([A-Z][^*\n]{4,39})\*"),
        compile(r"`([A-Z][^`\n]{4,39})`"),
    ]
});

pub struct QuotedExtractor;

impl MentionExtractor for QuotedExtractor {
    fn context(&self) -> ContextTag {
        ContextTag::Quoted
    }

    fn extract(&self, text: &str) -> Vec<CandidateMention> {
        to_mentions(captures(&QUOTED_PATTERNS, text), self.context())
    }
}

// Nature: gazetteer, Mount/Mt. X, and names ending in a nature noun

static LANDMARK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let mut names = NATURE_LANDMARKS.to_vec();
    // Longest first so "Santa Teresa County Park" beats "Santa Teresa"
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    compile(&format!(r"(?i)\b(?:{alternation})\b"))
});

static LANDMARK_LOOKUP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    NATURE_LANDMARKS
        .iter()
        .map(|name| (name.to_lowercase(), *name))
        .collect()
});

static NATURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"\b((?:Mount|Mt\.?)[ \t]+[A-Z][a-z]{2,}(?:[ \t]+[A-Z][a-z]{2,})*)"),
        compile(
            r"\b([A-Z][a-z]{2,}(?:[ \t]+[A-Z][a-z]{2,}){0,3}[ \t]+(?:Park|Trail|Hill|Peak|Observatory|Reserve|Preserve|Wilderness|Mountain|Ridge|Point|Lake|Creek|Valley|Beach))\b",
        ),
        compile(r"\b([A-Z][a-z]{2,}(?:[ \t]+[A-Z][a-z]{2,}){0,2}[ \t]+Open Space)\b"),
    ]
});

pub struct NatureExtractor;

impl MentionExtractor for NatureExtractor {
    fn context(&self) -> ContextTag {
        ContextTag::Nature
    }

    fn extract(&self, text: &str) -> Vec<CandidateMention> {
        // Gazetteer hits are reported in their canonical spelling
        let known = LANDMARK_PATTERN.find_iter(text).filter_map(|m| {
            LANDMARK_LOOKUP
                .get(&m.as_str().to_lowercase())
                .map(|canonical| CandidateMention::new(m.as_str(), canonical.to_string(), self.context()))
        });

        let patterned = captures(&NATURE_PATTERNS, text)
            .into_iter()
            .filter_map(|raw| longest_valid_tail(raw, self.context()));

        known.chain(patterned).collect()
    }
}

/// The regex match starts at the leftmost capitalized word, which may be a
/// verb or adverb ("Should Visit Alum Rock Park"). Drop leading words until
/// the rest is a valid name of at least two words.
fn longest_valid_tail(raw: &str, context: ContextTag) -> Option<CandidateMention> {
    let mut phrase = raw.trim();
    loop {
        let cleaned = clean_location_name(phrase);
        // "The Park" cleans down to a bare suffix
        if cleaned.split_whitespace().count() < 2 {
            return None;
        }
        if is_valid_location_name(&cleaned) {
            return Some(CandidateMention::new(phrase, cleaned, context));
        }
        phrase = phrase.split_once(char::is_whitespace)?.1.trim_start();
    }
}

// List: bullet / numbered items and "Name:" lines

static LIST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"(?m)^[ \t]*(?:[-•*+]|\d+[.)])[ \t]*([A-Z][A-Za-z ]{4,39})[ \t]*(?:[-:–]|$)"),
        compile(r"(?m)^[ \t]*([A-Z][A-Za-z ]{4,39})[ \t]*:"),
    ]
});

pub struct ListExtractor;

impl MentionExtractor for ListExtractor {
    fn context(&self) -> ContextTag {
        ContextTag::List
    }

    fn extract(&self, text: &str) -> Vec<CandidateMention> {
        to_mentions(captures(&LIST_PATTERNS, text), self.context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(mentions: &[CandidateMention]) -> Vec<&str> {
        mentions.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_recommendation_stops_at_conjunction() {
        let found = RecommendationExtractor
            .extract("You should check out Alum Rock Park and the rose garden.");
        assert_eq!(names(&found), vec!["Alum Rock Park"]);
        assert!(found.iter().all(|m| m.confidence == 0.9));
    }

    #[test]
    fn test_recommendation_handles_sentence_end() {
        let found = RecommendationExtractor.extract("Definitely visit the Lick Observatory.");
        assert_eq!(names(&found), vec!["Lick Observatory"]);
    }

    #[test]
    fn test_recommendation_ignores_lowercase_phrase() {
        let found = RecommendationExtractor.extract("try something new for once");
        assert!(found.is_empty());
    }

    #[test]
    fn test_descriptive() {
        let found = DescriptiveExtractor.extract("I think Sierra Vista is great at sunset.");
        assert_eq!(names(&found), vec!["Sierra Vista"]);
        assert_eq!(found[0].context, ContextTag::Descriptive);
    }

    #[test]
    fn test_business() {
        let found = BusinessExtractor.extract("We ate at the Blue Rock Country Club after.");
        assert!(names(&found).contains(&"Blue Rock Country Club"));
        assert!(found.iter().all(|m| m.context == ContextTag::Business));
    }

    #[test]
    fn test_quoted_variants() {
        let found = QuotedExtractor.extract("Locals call it \"Tank Hill\" or **Grizzly Peak** up there.");
        assert_eq!(names(&found), vec!["Tank Hill", "Grizzly Peak"]);
    }

    #[test]
    fn test_nature_gazetteer_uses_canonical_spelling() {
        let found = NatureExtractor.extract("we hiked mission peak yesterday");
        assert_eq!(names(&found), vec!["Mission Peak"]);
    }

    #[test]
    fn test_nature_mount_and_suffix() {
        let found = NatureExtractor.extract("Mt. Umunhum and Alum Rock Park were both nice.");
        let found = names(&found);
        assert!(found.contains(&"Mt. Umunhum"));
        assert!(found.contains(&"Alum Rock Park"));
    }

    #[test]
    fn test_nature_drops_sentence_opener() {
        let found = NatureExtractor.extract("Loved Alum Rock Park at sunset.");
        assert_eq!(names(&found), vec!["Alum Rock Park"]);
    }

    #[test]
    fn test_nature_retries_shorter_phrase() {
        let found = NatureExtractor.extract("You Should Visit Alum Rock Park");
        assert_eq!(names(&found), vec!["Alum Rock Park"]);
    }

    #[test]
    fn test_descriptive_drops_sentence_opener() {
        let found = DescriptiveExtractor.extract("Honestly Mission Peak is great.");
        assert_eq!(names(&found), vec!["Mission Peak"]);
    }

    #[test]
    fn test_nature_skips_bare_suffix() {
        let found = NatureExtractor.extract("The Park was closed.");
        assert!(found.is_empty());
    }

    #[test]
    fn test_list_items() {
        let text = "My picks:\n- Bernal Heights\n2. Corona Heights\nTank Hill: short climb";
        let found = ListExtractor.extract(text);
        let found = names(&found);
        assert!(found.contains(&"Bernal Heights"));
        assert!(found.contains(&"Corona Heights"));
        assert!(found.contains(&"Tank Hill"));
    }

    #[test]
    fn test_default_order() {
        let order: Vec<ContextTag> = default_strategies().iter().map(|s| s.context()).collect();
        assert_eq!(
            order,
            vec![
                ContextTag::Recommendation,
                ContextTag::Descriptive,
                ContextTag::Business,
                ContextTag::Quoted,
                ContextTag::Nature,
                ContextTag::List,
            ]
        );
    }
}
