//! Resilience helpers: retry with exponential backoff.

pub mod retry;
