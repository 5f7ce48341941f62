//! Image captioning through a vision-capable chat-completions model.
//!
//! This crate provides:
//! - [`CaptionClient`]: one chat request per image, retried on HTTP 429
//! - [`parse_caption`]: title/description extraction from free-form text
//! - [`RetryPolicy`]: how long to wait on a rate limit, and how often

mod client;
mod parse;
mod retry;

pub use client::{CaptionClient, SYSTEM_PROMPT, USER_PROMPT};
pub use parse::parse_caption;
pub use retry::{RETRY_AFTER_MS_HEADER, RetryPolicy, parse_retry_after_ms};
