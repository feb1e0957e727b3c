pub mod config;
pub mod report;
pub mod sink;
pub mod tracker;
