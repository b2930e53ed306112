// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod classify;
pub mod config;
pub mod digest;
pub mod ingest;
pub mod render;
pub mod snapshot;

// Delivery chain (SMTP, local MTA commands, chat webhook)
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::classify::Classifier;
pub use crate::digest::Digest;
pub use crate::ingest::types::Article;
pub use crate::ingest::Fetcher;
pub use crate::notify::{DeliveryChain, DeliveryTransport, DigestMessage};
