pub mod config;
pub mod datalayer;
pub mod ecommerce;
pub mod error;
pub mod event;
pub mod identity;
pub mod integration;
pub mod loader;
pub mod time;
