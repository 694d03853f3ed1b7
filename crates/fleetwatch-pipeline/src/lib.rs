//! Fleetwatch notification pipeline
//!
//! Turns provider webhook payloads into chat notifications:
//! classify → resolve subscribers → enrich → render → deliver.

pub mod classifier;
pub mod enricher;
mod error;
pub mod pipeline;
pub mod renderer;
pub mod resolver;

pub use classifier::{classify, DropReason};
pub use enricher::{Enrichment, EventEnricher};
pub use error::{PipelineError, Result};
pub use pipeline::{NotificationPipeline, WebhookOutcome};
pub use renderer::{render, render_body, render_timer_status, RenderedMessage};
pub use resolver::{resolve, Recipient};
