pub mod collection_run;
pub mod scraped_article;

pub use collection_run::{CollectionHealth, CollectionRun, NewCollectionRun};
pub use scraped_article::{NewScrapedArticle, ScrapedArticle};
