pub mod config;
pub mod project;
pub mod report;
pub mod scoring;
