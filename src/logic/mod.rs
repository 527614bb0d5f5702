//! Logic Module - Detection & Response Engines
//!
//! Chứa các engines xử lý: Indicator Store, Baseline, Detection Pipeline,
//! Incident Consolidator, Response Engine, Background Workers.

pub mod audit;
pub mod config;

pub mod baseline;
pub mod external_intel;
pub mod incident;
pub mod response;
pub mod threat;

pub mod engine;
pub mod workers;
