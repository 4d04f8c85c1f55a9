//! OS signal handling.
//!
//! SIGTERM and SIGINT request shutdown; SIGHUP requests a config reload.

/// What the process was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSignal {
    Shutdown,
    Reload,
}

/// Wait for the next signal of interest.
#[cfg(unix)]
pub async fn next_signal() -> std::io::Result<ProcessSignal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| ProcessSignal::Shutdown),
        _ = terminate.recv() => Ok(ProcessSignal::Shutdown),
        _ = hangup.recv() => Ok(ProcessSignal::Reload),
    }
}

#[cfg(not(unix))]
pub async fn next_signal() -> std::io::Result<ProcessSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(ProcessSignal::Shutdown)
}
