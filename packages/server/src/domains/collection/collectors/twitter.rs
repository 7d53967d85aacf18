use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use social_client::TwitterClient;

use super::merge_results;
use crate::domains::collection::collector::{CollectionTarget, Collector, RawMention};
use crate::domains::language::Dialect;
use crate::domains::mentions::Platform;

/// Recent search rejects queries longer than this.
const MAX_QUERY_LEN: usize = 512;
const TWEETS_PER_QUERY: u32 = 50;

/// Recent search with each tier dialect's election terms.
pub struct TwitterCollector {
    client: TwitterClient,
}

impl TwitterCollector {
    pub fn new(bearer_token: String) -> Self {
        Self {
            client: TwitterClient::new(bearer_token),
        }
    }
}

/// `(a OR "b c" ..) -is:retweet [lang:xx]`, dropping terms that would
/// overflow the length limit. Kurmanji and Badini have no search language code.
fn build_query(dialect: Dialect) -> String {
    let suffix = match dialect {
        Dialect::Arabic => " -is:retweet lang:ar",
        Dialect::English => " -is:retweet lang:en",
        Dialect::Sorani => " -is:retweet lang:ckb",
        Dialect::Badini | Dialect::Kurmanji => " -is:retweet",
    };

    let mut terms: Vec<String> = Vec::new();
    for term in dialect.search_terms() {
        let term = if term.contains(' ') {
            format!("\"{}\"", term)
        } else {
            term.to_string()
        };
        let candidate_len =
            terms.iter().map(|t| t.len() + 4).sum::<usize>() + term.len() + 2 + suffix.len();
        if candidate_len > MAX_QUERY_LEN {
            break;
        }
        terms.push(term);
    }

    format!("({}){}", terms.join(" OR "), suffix)
}

#[async_trait]
impl Collector for TwitterCollector {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn collect(&self, target: &CollectionTarget) -> Result<Vec<RawMention>> {
        let results = join_all(target.dialects.iter().map(|dialect| async move {
            self.client
                .search_recent(&build_query(*dialect), TWEETS_PER_QUERY)
                .await
                .map(|posts| {
                    posts
                        .into_iter()
                        .map(|post| RawMention::from_post(Platform::Twitter, post))
                        .collect::<Vec<_>>()
                })
        }))
        .await;

        merge_results(self.name(), results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_quotes_phrases_and_sets_language() {
        let query = build_query(Dialect::Arabic);
        assert!(query.starts_with("(انتخابات OR "));
        assert!(query.contains("\"حملة انتخابية\""));
        assert!(query.ends_with("-is:retweet lang:ar"));
    }

    #[test]
    fn queries_fit_the_limit() {
        for dialect in Dialect::ALL {
            assert!(build_query(dialect).len() <= MAX_QUERY_LEN);
        }
        assert!(build_query(Dialect::Kurmanji).ends_with("-is:retweet"));
    }
}
