use crate::gazetteer::{
    FILLER_PREFIXES, PARKING_TERMS, SENTENCE_LEADERS, STOPWORD_PREFIXES, TRAILING_CONNECTORS,
};

/// Minimum length of an accepted name, in characters.
const MIN_NAME_CHARS: usize = 4;

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &text[prefix.len()..])
}

/// Drop leading filler words ("the", "maybe", "near", ...), repeatedly.
pub fn strip_filler_prefixes(name: &str) -> &str {
    let mut rest = name.trim_start();
    loop {
        let stripped = FILLER_PREFIXES
            .iter()
            .find_map(|prefix| strip_prefix_ignore_case(rest, prefix));

        match stripped {
            Some(tail) => rest = tail.trim_start(),
            None => return rest,
        }
    }
}

/// Drop capitalized sentence openers ("Loved", "Honestly", ...) while at
/// least two words remain.
pub fn strip_sentence_leaders(name: &str) -> &str {
    let mut rest = name.trim_start();
    while let Some((first, tail)) = rest.split_once(char::is_whitespace) {
        let tail = tail.trim_start();
        let is_leader = SENTENCE_LEADERS
            .iter()
            .any(|word| first.eq_ignore_ascii_case(word));
        if !is_leader || tail.split_whitespace().count() < 2 {
            break;
        }
        rest = tail;
    }
    rest
}

fn strip_trailing_connector(name: &str) -> Option<&str> {
    let (head, last) = name.rsplit_once(char::is_whitespace)?;
    TRAILING_CONNECTORS
        .iter()
        .any(|word| last.eq_ignore_ascii_case(word))
        .then(|| head.trim_end())
}

/// Clean a captured phrase into a candidate place name.
pub fn clean_location_name(raw: &str) -> String {
    let mut cleaned = strip_filler_prefixes(strip_sentence_leaders(strip_filler_prefixes(raw.trim())))
        .trim_end();

    loop {
        let before = cleaned.len();
        cleaned = cleaned
            .trim_end_matches([',', '.', '-', '!', '?', ';'])
            .trim_end();
        if let Some(head) = strip_trailing_connector(cleaned) {
            cleaned = head;
        }
        if cleaned.len() == before {
            break;
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reject names that cannot be a place. Rejection is silent.
pub fn is_valid_location_name(name: &str) -> bool {
    if name.chars().count() < MIN_NAME_CHARS {
        return false;
    }

    if !name.chars().any(char::is_uppercase) {
        return false;
    }

    let lower = name.trim().to_lowercase();

    if STOPWORD_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return false;
    }

    !PARKING_TERMS.iter().any(|term| lower.contains(term))
}
