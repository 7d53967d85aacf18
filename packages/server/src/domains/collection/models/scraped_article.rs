use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ScrapedArticleId;

/// Election-related article stored by the web scraper, unique by URL.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScrapedArticle {
    pub id: ScrapedArticleId,
    pub url: String,
    pub title: String,
    pub content: String,
    pub source_name: String,
    pub source_type: String, // 'news' | 'official' | 'party'
    pub governorate: Option<String>,
    pub dialect: Option<String>,
    pub relevance_score: f64,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub published_text: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewScrapedArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub source_name: String,
    pub source_type: String,
    pub governorate: Option<String>,
    pub dialect: Option<String>,
    pub relevance_score: f64,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub published_text: Option<String>,
}

impl ScrapedArticle {
    /// Stores the article unless its URL is already known. Returns whether a row was written.
    pub async fn insert_if_new(article: &NewScrapedArticle, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO scraped_articles (
                id, url, title, content, source_name, source_type, governorate,
                dialect, relevance_score, sentiment, sentiment_score, published_text
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(ScrapedArticleId::new())
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.source_name)
        .bind(&article.source_type)
        .bind(&article.governorate)
        .bind(&article.dialect)
        .bind(article.relevance_score)
        .bind(&article.sentiment)
        .bind(article.sentiment_score)
        .bind(&article.published_text)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn find_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM scraped_articles ORDER BY scraped_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_older_than(days: i32, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM scraped_articles WHERE scraped_at < NOW() - make_interval(days => $1)",
        )
        .bind(days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
