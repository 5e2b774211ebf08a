//! Migration Controller
//!
//! Reconciles `Migration` resources: resolves the referenced Plan, source
//! Provider and per-VM Hosts, validates them, and publishes a `Ready` or
//! blocker condition in the Migration status.

mod backoff;
mod controller;
mod error;
mod reconciler;
mod references;
mod status;
mod store;
mod validation;
mod watcher;

#[cfg(test)]
mod reconciler_test;
#[cfg(test)]
mod test_utils;

use anyhow::Context;
use controller::Controller;
use settings::{Role, Settings};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("rustls crypto provider already installed");
    }

    info!("Starting Migration Controller");

    let settings = Settings::load().context("invalid controller settings")?;
    if !settings.role.has(Role::Main) {
        info!("Role 'main' not enabled, nothing to run");
        return Ok(());
    }

    info!("Configuration:");
    info!("  Inventory URL: {}", settings.inventory.url);
    info!("  Max VMs in flight: {}", settings.migration.max_in_flight);
    info!(
        "  Namespace: {}",
        settings.migration.namespace.as_deref().unwrap_or("all namespaces")
    );

    let controller = Controller::new(Arc::new(settings)).await?;
    controller.run().await?;

    Ok(())
}
