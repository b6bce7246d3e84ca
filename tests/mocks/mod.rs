pub mod fetcher;
pub mod summarizer;
