//! HTTP plumbing for provider integrations

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};
