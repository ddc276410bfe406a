use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use agentwatch_core::AgentwatchConfig;
use agentwatch_remediate::PassResult;

use super::{build_monitor, EventArgs};

pub async fn run(config: &AgentwatchConfig, event: EventArgs) -> anyhow::Result<()> {
    let pass = event.into_pass_config()?;
    let monitor = build_monitor(config)?;

    let result = monitor.run_once(&pass).await?;
    print!("{}", format_summary(&result, pass.fail_after.get()));
    Ok(())
}

pub async fn watch(config: &AgentwatchConfig, event: EventArgs, interval: u64) -> anyhow::Result<()> {
    let pass = event.into_pass_config()?;
    let monitor = build_monitor(config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

    monitor
        .run_loop(&pass, Duration::from_secs(interval), shutdown_rx)
        .await;
    Ok(())
}

/// Flip `shutdown` once `signal` fires.
///
/// If the signal cannot be installed the sender is held forever, so the
/// loop keeps running instead of reading a closed channel as shutdown.
async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("shutdown signal received; finishing current pass");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            error!(error = %e, "failed to listen for ctrl-c; stop the process to exit");
            std::future::pending::<()>().await;
        }
    }
}

fn format_summary(result: &PassResult, threshold: u64) -> String {
    let mut out = String::new();
    for (id, failures) in &result.tracked {
        out.push_str(&format!("tracked     {id}  {failures}/{threshold}\n"));
    }
    for id in &result.terminated {
        out.push_str(&format!("terminated  {id}\n"));
    }
    for failure in &result.failures {
        out.push_str(&format!("failed      {}  {}\n", failure.instance_id, failure.error));
    }
    if out.is_empty() {
        out.push_str("all agents connected\n");
    }
    out
}
