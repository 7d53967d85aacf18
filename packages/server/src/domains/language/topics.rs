use std::collections::HashSet;

use super::lexicon::{
    ARABIC_ELECTION_TERMS, BADINI_ELECTION_TERMS, ENGLISH_ELECTION_TERMS,
    KURMANJI_ELECTION_TERMS, SORANI_ELECTION_TERMS, TOPICS,
};
use super::text::{contains_phrase, contains_token_phrase, tokenize};

/// Terms beyond the per-dialect search lists that still mark election content.
const EXTRA_ELECTION_TERMS: &[&str] = &[
    "iec",
    "ballot box",
    "polling station",
    "مفوضية",
    "الاقتراع",
    "اقتراع",
    "بنکەی دەنگدان",
];

/// Topics mentioned in the text, in declaration order.
pub fn extract_topics(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOPICS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| contains_phrase(&lower, w)))
        .map(|(topic, _)| topic.to_string())
        .collect()
}

fn election_hits(text: &str) -> usize {
    let lower = text.to_lowercase();
    [
        SORANI_ELECTION_TERMS,
        BADINI_ELECTION_TERMS,
        KURMANJI_ELECTION_TERMS,
        ARABIC_ELECTION_TERMS,
        ENGLISH_ELECTION_TERMS,
        EXTRA_ELECTION_TERMS,
    ]
    .iter()
    .flat_map(|terms| terms.iter())
    .copied()
    .collect::<HashSet<&str>>()
    .into_iter()
    .filter(|term| contains_phrase(&lower, term))
    .count()
}

pub fn is_election_related(text: &str) -> bool {
    election_hits(text) > 0
}

/// Election relevance in [0, 1]: 0 without keywords, else 0.4 plus 0.15 per
/// distinct keyword, capped at 1.
pub fn election_relevance(text: &str) -> f64 {
    let hits = election_hits(text);
    if hits == 0 {
        return 0.0;
    }
    // Whole percentages keep thresholds like 0.7 exactly comparable.
    let percent = (40 + 15 * hits).min(100);
    percent as f64 / 100.0
}

/// Registered candidate names appearing in the text as whole tokens.
pub fn match_candidates<'a>(text: &str, names: &'a [String]) -> Vec<&'a str> {
    let tokens = tokenize(text);
    names
        .iter()
        .filter(|name| name.trim().chars().count() >= 3)
        .filter(|name| contains_token_phrase(&tokens, name))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_across_languages() {
        let topics = extract_topics("Government salaries and الفساد");
        assert_eq!(topics, vec!["government", "corruption"]);
        assert!(extract_topics("nice weather").is_empty());
    }

    #[test]
    fn relevance_grows_with_distinct_keywords() {
        assert_eq!(election_relevance("lovely day"), 0.0);
        assert_eq!(election_relevance("election day"), 0.55);
        assert_eq!(election_relevance("election candidate campaign"), 0.85);
        assert_eq!(election_relevance("انتخابات مرشح برلمان تصويت ناخبين"), 1.0);
    }

    #[test]
    fn two_keywords_reach_storage_threshold() {
        assert!(election_relevance("المرشح في الانتخابات") >= 0.7);
        assert!(election_relevance("مرشح") < 0.7);
    }

    #[test]
    fn election_detection_in_kurdish() {
        assert!(is_election_related("هەڵبژاردنی ئەمساڵ"));
        assert!(is_election_related("Hilbijartin nêzîk e"));
        assert!(!is_election_related("football match tonight"));
    }

    #[test]
    fn candidate_names_match_on_boundaries() {
        let names = vec![
            "Masrour Barzani".to_string(),
            "Ali".to_string(),
            "محمد شياع السوداني".to_string(),
        ];
        let hits = match_candidates("Rally for masrour barzani, not Alina", &names);
        assert_eq!(hits, vec!["Masrour Barzani"]);

        let hits = match_candidates("زار محمد شياع السوداني البصرة", &names);
        assert_eq!(hits, vec!["محمد شياع السوداني"]);
    }

    #[test]
    fn arabic_names_do_not_match_inside_words() {
        let names = vec!["علي".to_string(), "حسن".to_string()];
        assert!(match_candidates("عليهم ان يحسنوا الخدمات", &names).is_empty());
        assert_eq!(
            match_candidates("التقى علي بالناخبين وحسن", &names),
            vec!["علي", "حسن"]
        );
    }
}
