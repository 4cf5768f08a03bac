//! Research Desk - client core for the investment research dashboard
//!
//! Typed client logic for the research backend: company registry reads,
//! knowledge-base refresh jobs with status polling, and the sequential
//! document upload / batch-analysis pipeline. A UI shell (desktop or web)
//! drives the services layer; all substantive computation happens in the
//! backend service.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for a hosting shell
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "research_desk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Research Desk client core initialized");
}
