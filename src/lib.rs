pub mod catalog;
pub mod config;
pub mod output;
pub mod request;
pub mod scoring;
pub mod store;
