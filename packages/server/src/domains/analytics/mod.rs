//! Analytics domain: campaign dashboards built from stored mentions and
//! collection runs.

pub mod metrics;
pub mod queries;
pub mod reports;

pub use metrics::{growth_percent, half_trend, hourly_buckets, rising_candidates, tier_reports};
pub use reports::{
    dashboard, kurdistan, priority, region_trends, resolve_region, DashboardMetrics,
    KurdistanAnalytics, Period, PriorityAnalytics,
};
