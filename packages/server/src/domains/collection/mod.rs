//! Collection domain: collectors, the web scraper, the region scheduler and
//! the worker that turns collected posts into stored mentions.

pub mod collector;
pub mod collectors;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod scraper;
pub mod worker;

pub use collector::{CollectionTarget, Collector, HandleOwner, RawMention, SocialHandle};
pub use collectors::platform_collectors;
pub use models::{CollectionHealth, CollectionRun, ScrapedArticle};
pub use pipeline::{classify, process_mention, rescore_unanalyzed, CandidateMatcher, ProcessOutcome};
pub use scheduler::{DueTier, RegionScheduler, ScheduleReason, TierStatus};
pub use scraper::{ScrapeTarget, SourceType, WebScraper, SCRAPE_TARGETS};
pub use worker::{CollectKind, CollectNowReport, CollectionWorker, CycleReport, Trigger, WorkerStatus, SCHEDULER_TICK};
