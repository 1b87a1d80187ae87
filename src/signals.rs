//! Shutdown signal handling.
//!
//! On Unix the supervisor reacts to **SIGINT** (Ctrl-C), **SIGTERM** (default kill signal, used by
//! systemd and container runtimes) and **SIGQUIT**.
use futures_util::{Stream, StreamExt, stream};
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::watch;

use crate::error::ResultLogExt;

/// Registered listeners for the termination signals.
///
/// While a `ShutdownSignals` exists the signals no longer terminate the process.
#[derive(Debug)]
pub struct ShutdownSignals {
    sigint: Signal,
    sigterm: Signal,
    sigquit: Signal,
}

impl ShutdownSignals {
    /// Registers the signal listeners. Must be called from within a tokio runtime.
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Completes when any of the signals is received and returns its name.
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigint.recv()  => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigquit.recv() => "SIGQUIT",
        }
    }

    /// Every received signal, by name, for as long as the listeners live.
    pub fn into_stream(self) -> impl Stream<Item = &'static str> + Send + Unpin {
        Box::pin(stream::unfold(self, |mut signals| async move {
            let name = signals.recv().await;
            Some((name, signals))
        }))
    }
}

/// Forwards `signals` into `tx`, returning how many signals were seen once the stream ends.
///
/// The first signal requests shutdown. Later signals are logged and otherwise ignored, so a
/// repeated Ctrl-C cannot cut cleanup short.
pub async fn relay_signals(
    mut signals: impl Stream<Item = &'static str> + Unpin,
    tx: watch::Sender<bool>,
) -> usize {
    let mut received = 0;
    while let Some(name) = signals.next().await {
        received += 1;
        if received == 1 {
            log::info!("Received {}", name);
            log::info!("Shutdown requested, finishing current work before cleanup...");
            let _ = tx.send(true);
        } else {
            log::warn!(
                "Received {} while shutting down, waiting for cleanup to finish...",
                name
            );
        }
    }
    received
}

/// Starts listening for termination signals.
///
/// The listeners are registered before this returns; the returned receiver flips to `true` once
/// a signal arrives. The listeners stay installed afterwards, so further signals are logged
/// instead of killing the process mid-cleanup. If registration fails the error is logged and the
/// receiver never fires.
/// Must be called from within a tokio runtime.
pub fn shutdown_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    let signals =
        ShutdownSignals::register().log_err("failed to install shutdown signal handlers");

    tokio::spawn(async move {
        match signals {
            Some(signals) => {
                relay_signals(signals.into_stream(), tx).await;
            }
            // Hold on to the sender, a closed channel reads as a shutdown request.
            None => tx.closed().await,
        }
    });
    rx
}
