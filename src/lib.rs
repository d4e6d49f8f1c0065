//! SofaScore player stats: normalize scraped profile lines, parse them into
//! player records, drop duplicates and export or store the result.

pub mod collector;
pub mod config;
pub mod export;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod processing;
pub mod storage;
pub mod utils;
