pub mod extractor;
pub mod parse;
pub mod platform;
pub mod query;
pub mod report;
pub mod runner;
