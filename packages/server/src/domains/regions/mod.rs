//! Regions domain: Iraqi governorates, their collection priority tiers,
//! the Kurdistan IP ranges and regional trend summaries.

pub mod governorate;
pub mod network;
pub mod tier;
pub mod trends;

pub use governorate::{extract_governorate, Governorate, RegionType};
pub use network::is_kurdistan_ip;
pub use tier::{calculate_priority_score, PriorityTier};
pub use trends::{regional_trends, sentiment_trend, RegionalTrends, Trend};
