//! Web scraper for Iraqi news, government and party sites.
//!
//! Static HTML only: pages are fetched with reqwest and parsed with
//! `scraper` CSS selectors. Each source type has its own container
//! selectors and acceptance rule.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::{ElementRef, Html, Selector};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use url::Url;

use super::models::{NewScrapedArticle, ScrapedArticle};
use crate::domains::language::{analyze_sentiment, detect_dialect, election_relevance};
use crate::domains::regions::{extract_governorate, Governorate};

const MAX_ARTICLES_PER_SITE: usize = 10;
const MAX_CONCURRENT_SITES: usize = 4;

/// News articles below this election relevance are dropped.
const MIN_NEWS_RELEVANCE_PERCENT: i64 = 70;

const TITLE_SELECTOR: &str = "h1, h2, h3, .title, .headline";
const CONTENT_SELECTOR: &str = "p, .content, .excerpt";
const LINK_SELECTOR: &str = "a[href]";
const DATE_SELECTOR: &str = "time, .date, .published";

const CANDIDATE_KEYWORDS: &[&str] = &["مرشح", "كانديد", "کاندید", "candidate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    News,
    Official,
    Party,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Official => "official",
            Self::Party => "party",
        }
    }

    fn container_selector(&self) -> &'static str {
        match self {
            Self::News => "article, .article, .news-item, .post, .entry",
            Self::Official => ".announcement, .press-release, .official-statement, .news-release, article",
            Self::Party => "article, .statement, .announcement, .policy, .candidate",
        }
    }

    fn accepts(&self, title: &str, content: &str) -> bool {
        match self {
            Self::News => relevance_percent(&format!("{} {}", title, content)) >= MIN_NEWS_RELEVANCE_PERCENT,
            Self::Official => true,
            Self::Party => {
                let lower = title.to_lowercase();
                CANDIDATE_KEYWORDS.iter().any(|k| lower.contains(k))
            }
        }
    }
}

fn relevance_percent(text: &str) -> i64 {
    (election_relevance(text) * 100.0).round() as i64
}

#[derive(Debug, Clone, Copy)]
pub struct ScrapeTarget {
    pub name: &'static str,
    pub url: &'static str,
    pub source_type: SourceType,
    pub governorate: Option<Governorate>,
}

const fn target(
    name: &'static str,
    url: &'static str,
    source_type: SourceType,
    governorate: Option<Governorate>,
) -> ScrapeTarget {
    ScrapeTarget {
        name,
        url,
        source_type,
        governorate,
    }
}

pub const SCRAPE_TARGETS: &[ScrapeTarget] = &[
    target("Al Jazeera", "https://www.aljazeera.net", SourceType::News, None),
    target("BBC Arabic", "https://www.bbc.com/arabic", SourceType::News, None),
    target("Alhurra", "https://www.alhurra.com", SourceType::News, None),
    target("DW Arabic", "https://www.dw.com/ar", SourceType::News, None),
    target("Rudaw", "https://www.rudaw.net", SourceType::News, Some(Governorate::Erbil)),
    target("Kurdistan 24", "https://www.kurdistan24.net", SourceType::News, Some(Governorate::Erbil)),
    target("Shafaq News", "https://www.shafaaq.com", SourceType::News, None),
    target("Iraqi News", "https://www.iraqinews.com", SourceType::News, Some(Governorate::Baghdad)),
    target("IHEC", "https://www.iec.gov.iq", SourceType::Official, Some(Governorate::Baghdad)),
    target("Council of Representatives", "https://www.parliament.iq", SourceType::Official, Some(Governorate::Baghdad)),
    target("KDP", "https://www.kdp.info", SourceType::Party, Some(Governorate::Erbil)),
    target("PUK Media", "https://www.pukmedia.com", SourceType::Party, Some(Governorate::Sulaymaniyah)),
];

/// Article fields pulled out of a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArticle {
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_text: Option<String>,
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(collapse_text)
        .find(|t| !t.is_empty())
}

/// Extracts accepted articles from a listing page. Articles without a
/// resolvable link are skipped since articles are keyed by URL.
pub fn extract_articles(html: &str, base_url: &Url, source_type: SourceType) -> Vec<ExtractedArticle> {
    let (Ok(containers), Ok(title_sel), Ok(content_sel), Ok(link_sel), Ok(date_sel)) = (
        Selector::parse(source_type.container_selector()),
        Selector::parse(TITLE_SELECTOR),
        Selector::parse(CONTENT_SELECTOR),
        Selector::parse(LINK_SELECTOR),
        Selector::parse(DATE_SELECTOR),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut articles: Vec<ExtractedArticle> = Vec::new();

    for element in document.select(&containers) {
        let Some(title) = first_text(element, &title_sel) else {
            continue;
        };
        let content = first_text(element, &content_sel).unwrap_or_default();
        if !source_type.accepts(&title, &content) {
            continue;
        }

        let Some(url) = element
            .select(&link_sel)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| base_url.join(href).ok())
            .filter(|u| matches!(u.scheme(), "http" | "https"))
        else {
            continue;
        };

        let published_text = element.select(&date_sel).next().and_then(|d| {
            d.value()
                .attr("datetime")
                .map(str::to_string)
                .or_else(|| Some(collapse_text(d)))
                .filter(|t| !t.is_empty())
        });

        let url = url.to_string();
        if articles.iter().any(|a| a.url == url) {
            continue;
        }

        articles.push(ExtractedArticle {
            title,
            content,
            url,
            published_text,
        });
        if articles.len() >= MAX_ARTICLES_PER_SITE {
            break;
        }
    }

    articles
}

fn classify(article: ExtractedArticle, target: &ScrapeTarget) -> NewScrapedArticle {
    let text = format!("{} {}", article.title, article.content);
    let sentiment = analyze_sentiment(&text);
    let detection = detect_dialect(&text);
    let governorate = extract_governorate(&text).or(target.governorate);

    NewScrapedArticle {
        url: article.url,
        title: article.title,
        content: article.content,
        source_name: target.name.to_string(),
        source_type: target.source_type.as_str().to_string(),
        governorate: governorate.map(|g| g.as_str().to_string()),
        dialect: Some(detection.dialect.as_str().to_string()),
        relevance_score: election_relevance(&text),
        sentiment: sentiment.sentiment.as_str().to_string(),
        sentiment_score: sentiment.score,
        published_text: article.published_text,
    }
}

pub struct WebScraper {
    client: reqwest::Client,
    targets: Vec<ScrapeTarget>,
}

impl WebScraper {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ar,ckb;q=0.9,ku;q=0.8,en;q=0.7"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)")
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            targets: SCRAPE_TARGETS.to_vec(),
        })
    }

    pub fn with_targets(mut self, targets: Vec<ScrapeTarget>) -> Self {
        self.targets = targets;
        self
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response.text().await.context("Failed to read response body")
    }

    /// Scrapes one site and stores new articles. Returns how many were stored.
    pub async fn scrape_target(&self, target: &ScrapeTarget, pool: &PgPool) -> Result<usize> {
        let base_url = Url::parse(target.url).with_context(|| format!("Invalid target URL {}", target.url))?;
        let html = self.fetch_html(target.url).await?;
        let articles = extract_articles(&html, &base_url, target.source_type);
        debug!(site = target.name, found = articles.len(), "Extracted articles");

        let mut stored = 0;
        for article in articles {
            if ScrapedArticle::insert_if_new(&classify(article, target), pool).await? {
                stored += 1;
            }
        }
        Ok(stored)
    }

    /// Scrapes every target. A failing site is logged and skipped.
    pub async fn scrape_all(&self, pool: &PgPool) -> Result<usize> {
        let scrapes: Vec<_> = self
            .targets
            .iter()
            .map(|target| async move {
                match self.scrape_target(target, pool).await {
                    Ok(stored) => (stored, true),
                    Err(e) => {
                        warn!(site = target.name, error = %e, "Failed to scrape site");
                        (0, false)
                    }
                }
            })
            .collect();
        let results: Vec<(usize, bool)> = stream::iter(scrapes)
            .buffer_unordered(MAX_CONCURRENT_SITES)
            .collect()
            .await;

        let stored: usize = results.iter().map(|(n, _)| n).sum();
        let failed = results.iter().filter(|(_, ok)| !ok).count();
        info!(stored, failed_sites = failed, sites = results.len(), "Web scraping complete");
        Ok(stored)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}
