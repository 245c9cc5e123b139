//! Remote fetching from the knowledge base.

pub mod ask_parser;
pub mod batch;
pub mod client;

pub use batch::{BatchOutcome, BatchResult, FetchReport};
pub use client::{HttpTransport, WikiClient};
