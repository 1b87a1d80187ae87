//! Launch, health monitoring and guaranteed cleanup of the supervised containers.
//!
//! A run goes through three sequential phases, all operating on the same [`LiveSet`]:
//!
//! 1. [`Reconciler`] launches the desired containers, replacing stale ones with the same name.
//! 2. [`HealthMonitor`] polls the launched containers until a shutdown is requested.
//! 3. [`CleanupCoordinator`] stops and removes whatever is still tracked.
//!
//! [`Session`] owns the live set across the phases and is the single place cleanup is run from.
mod cleanup;
mod monitor;
mod reconcile;
mod session;
mod tracked;

pub use cleanup::{CleanupCoordinator, CleanupReport};
pub use monitor::{HealthMonitor, TickReport};
pub use reconcile::{ReconcileReport, Reconciler};
pub use session::Session;
pub use tracked::{LiveSet, TrackedContainer};
