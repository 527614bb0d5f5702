//! External Intelligence
//!
//! Known-bad indicator storage plus line-oriented threat feed ingestion.

pub mod feed;
pub mod store;
pub mod types;

pub use feed::{fetch_feed, parse_feed_lines, FeedError, FeedSource};
pub use store::IndicatorStore;
pub use types::{Indicator, IndicatorKind, IndicatorUpdate};
