//! Product-page scraping for pricewatch.
//!
//! URLs are resolved to a site adapter by source key. Supported storefronts
//! go through a deterministic fetch → parse → extract pipeline; everything
//! else is delegated to a browsing agent. The [`Orchestrator`] runs a batch
//! of URLs on a bounded task pool and hands each extracted
//! [`pricewatch_core::PriceRecord`] to a [`pricewatch_core::ProductStore`].

pub mod adapters;
pub mod agent;
pub mod client;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod pipeline;
mod rate_limit;
pub mod registry;

pub use adapters::{Extractor, SelectorAdapter, SiteSelectors};
pub use agent::{AgentClient, AgentRequest, FallbackStrategy, HttpAgentClient, NoAgent};
pub use client::{BrowserClient, PageFetcher};
pub use error::{AgentError, ScrapeError};
pub use orchestrator::{BatchSummary, Orchestrator, Outcome};
pub use registry::{AdapterRegistry, Resolution, SourceKey};
