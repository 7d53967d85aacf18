//! Classification and storage of collected posts.

use anyhow::Result;
use sqlx::PgPool;

use super::collector::{CollectionTarget, RawMention};
use crate::common::{CandidateId, MentionId};
use crate::domains::candidates::{Candidate, CandidateNames};
use crate::domains::language::{analyze_sentiment, detect_dialect, match_candidates, Detection};
use crate::domains::mentions::{Mention, NewMention};
use crate::domains::regions::extract_governorate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Inserted {
        id: MentionId,
        candidates: Vec<CandidateId>,
        is_kurdistan: bool,
    },
    Updated {
        id: MentionId,
        candidates: Vec<CandidateId>,
        is_kurdistan: bool,
    },
    Rejected(&'static str),
}

impl ProcessOutcome {
    pub fn candidates(&self) -> &[CandidateId] {
        match self {
            Self::Inserted { candidates, .. } | Self::Updated { candidates, .. } => candidates,
            Self::Rejected(_) => &[],
        }
    }

    pub fn is_kurdistan(&self) -> bool {
        match self {
            Self::Inserted { is_kurdistan, .. } | Self::Updated { is_kurdistan, .. } => *is_kurdistan,
            Self::Rejected(_) => false,
        }
    }
}

/// Registered candidate names, matched against post text.
#[derive(Debug, Clone, Default)]
pub struct CandidateMatcher {
    entries: Vec<(CandidateId, Vec<String>)>,
}

impl CandidateMatcher {
    pub fn new(names: Vec<CandidateNames>) -> Self {
        Self {
            entries: names.into_iter().map(|n| (n.id, n.names())).collect(),
        }
    }

    pub async fn load(pool: &PgPool) -> Result<Self> {
        Ok(Self::new(Candidate::all_names(pool).await?))
    }

    pub fn matches(&self, text: &str) -> Vec<CandidateId> {
        self.entries
            .iter()
            .filter(|(_, names)| !match_candidates(text, names).is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The account owner first, then candidates named in the text.
fn linked_candidates(raw: &RawMention, mut named: Vec<CandidateId>) -> Vec<CandidateId> {
    if let Some(owner) = raw.candidate_id {
        named.retain(|id| *id != owner);
        named.insert(0, owner);
    }
    named
}

/// Classifies a raw post into an insert payload, or the reason it was rejected.
pub fn classify(
    raw: &RawMention,
    target: &CollectionTarget,
    matcher: &CandidateMatcher,
) -> std::result::Result<NewMention, &'static str> {
    let content = raw.content.trim();
    if content.is_empty() {
        return Err("empty content");
    }

    let detection = match raw.dialect {
        Some(dialect) => Detection {
            dialect,
            confidence: 1.0,
        },
        None => detect_dialect(content),
    };
    let governorate = raw
        .governorate
        .or_else(|| extract_governorate(content))
        .or_else(|| target.default_governorate());
    let analysis = analyze_sentiment(content);

    Ok(NewMention::builder()
        .platform(raw.platform.as_str())
        .content(content)
        .user_id(raw.user_id)
        .author_name(raw.author_name.clone())
        .author_handle(raw.author_handle.clone())
        .post_id(raw.post_id.clone())
        .post_url(raw.post_url.clone())
        .media_url(raw.media_url.clone())
        .likes(raw.likes)
        .comments(raw.comments)
        .shares(raw.shares)
        .views(raw.views)
        .sentiment(analysis.sentiment)
        .sentiment_score(analysis.score)
        .dialect(Some(detection.dialect))
        .dialect_confidence(detection.confidence)
        .governorate(governorate)
        .topics(analysis.topics)
        .analyzed(true)
        .published_at(raw.published_at)
        .candidate_ids(linked_candidates(raw, matcher.matches(content)))
        .build())
}

/// Classifies and stores one collected post.
pub async fn process_mention(
    raw: &RawMention,
    target: &CollectionTarget,
    matcher: &CandidateMatcher,
    pool: &PgPool,
) -> Result<ProcessOutcome> {
    let new = match classify(raw, target, matcher) {
        Ok(new) => new,
        Err(reason) => return Ok(ProcessOutcome::Rejected(reason)),
    };

    let is_kurdistan = new.governorate.is_some_and(|g| g.is_kurdistan());
    let outcome = Mention::upsert(&new, pool).await?;
    let candidates = new.candidate_ids;

    Ok(if outcome.inserted {
        ProcessOutcome::Inserted {
            id: outcome.id,
            candidates,
            is_kurdistan,
        }
    } else {
        ProcessOutcome::Updated {
            id: outcome.id,
            candidates,
            is_kurdistan,
        }
    })
}

/// Analyses mentions stored without sentiment (e.g. imported rows) in the
/// last `days`. Returns how many were scored.
pub async fn rescore_unanalyzed(days: i64, limit: i64, pool: &PgPool) -> Result<usize> {
    let since = chrono::Utc::now() - chrono::Duration::days(days);
    let mentions = Mention::find_unscored_since(since, limit, pool).await?;
    for mention in &mentions {
        let analysis = analyze_sentiment(&mention.content);
        let detection = detect_dialect(&mention.content);
        Mention::update_sentiment(mention.id, &analysis, &detection, pool).await?;
    }
    Ok(mentions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::language::{Dialect, Sentiment};
    use crate::domains::mentions::Platform;
    use crate::domains::regions::{Governorate, PriorityTier};

    fn matcher() -> (CandidateMatcher, CandidateId) {
        let id = CandidateId::new();
        let matcher = CandidateMatcher::new(vec![CandidateNames {
            id,
            name_ar: "شاسوار عبدالواحد".into(),
            name_en: Some("Shaswar Abdulwahid".into()),
            name_sorani: None,
            name_badini: None,
            name_kurmanji: None,
        }]);
        (matcher, id)
    }

    #[test]
    fn rejects_blank_posts() {
        let target = CollectionTarget::for_tier(PriorityTier::Erbil);
        let raw = RawMention::new(Platform::Twitter, "   \n ");
        assert_eq!(classify(&raw, &target, &CandidateMatcher::default()).unwrap_err(), "empty content");
    }

    #[test]
    fn text_governorate_beats_target_default() {
        let target = CollectionTarget::for_tier(PriorityTier::Other);
        let raw = RawMention::new(Platform::Twitter, "Great rally for the election in Kirkuk");
        let new = classify(&raw, &target, &CandidateMatcher::default()).unwrap();
        assert_eq!(new.governorate, Some(Governorate::Kirkuk));
        assert_eq!(new.dialect, Some(Dialect::English));
        assert!(new.analyzed);
    }

    #[test]
    fn falls_back_to_target_governorate() {
        let target = CollectionTarget::for_tier(PriorityTier::Sulaymaniyah);
        let raw = RawMention::new(Platform::Facebook, "كاندیدەکان بۆ هەڵبژاردن ئامادەن");
        let new = classify(&raw, &target, &CandidateMatcher::default()).unwrap();
        assert_eq!(new.governorate, Some(Governorate::Sulaymaniyah));
        assert_eq!(new.dialect, Some(Dialect::Sorani));
    }

    #[test]
    fn known_dialect_is_trusted() {
        let target = CollectionTarget::for_tier(PriorityTier::Baghdad);
        let mut raw = RawMention::new(Platform::Youtube, "hello");
        raw.dialect = Some(Dialect::Arabic);
        let new = classify(&raw, &target, &CandidateMatcher::default()).unwrap();
        assert_eq!(new.dialect, Some(Dialect::Arabic));
        assert_eq!(new.dialect_confidence, 1.0);
    }

    #[test]
    fn links_registered_candidates() {
        let (matcher, id) = matcher();
        let target = CollectionTarget::for_tier(PriorityTier::Sulaymaniyah);
        let raw = RawMention::new(
            Platform::Twitter,
            "Shaswar Abdulwahid gave an excellent speech about the election",
        );
        let new = classify(&raw, &target, &matcher).unwrap();
        assert_eq!(new.candidate_ids, vec![id]);
        assert_eq!(new.sentiment, Sentiment::Positive);

        let other = RawMention::new(Platform::Twitter, "Nothing about anyone");
        assert!(classify(&other, &target, &matcher).unwrap().candidate_ids.is_empty());
    }

    #[test]
    fn page_owner_is_linked_without_being_named() {
        let (matcher, named) = matcher();
        let owner = CandidateId::new();
        let target = CollectionTarget::for_tier(PriorityTier::Duhok);

        let mut raw = RawMention::new(Platform::Facebook, "Thank you all for coming tonight");
        raw.candidate_id = Some(owner);
        assert_eq!(classify(&raw, &target, &matcher).unwrap().candidate_ids, vec![owner]);

        raw.content = "Thank you Shaswar Abdulwahid for coming tonight".into();
        assert_eq!(
            classify(&raw, &target, &matcher).unwrap().candidate_ids,
            vec![owner, named]
        );
    }
}
