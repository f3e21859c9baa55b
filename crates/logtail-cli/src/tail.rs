//! The tail command: one session per phase, all sharing the terminal.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use logtail_client::{ChannelEmitter, DefaultTailClient, TailSummary, TerminalSink};
use logtail_core::{TailEvent, TailSinkPort};

use crate::bootstrap::TailPlan;
use crate::error::CliError;

/// Run every phase in `plan` until each one finishes or Ctrl-C stops them.
pub async fn run(plan: TailPlan) -> Result<Vec<TailSummary>, CliError> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    run_with(plan, std::io::stdout(), ctrl_c).await
}

/// Run every phase in `plan`, writing log text to `out`.
///
/// All sessions stop when `interrupt` completes.
pub async fn run_with<W, F>(
    plan: TailPlan,
    out: W,
    interrupt: F,
) -> Result<Vec<TailSummary>, CliError>
where
    W: Write + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let mut client = DefaultTailClient::new(plan.client)?;
    let mut event_printer = None;
    if plan.events {
        let (emitter, rx) = ChannelEmitter::channel();
        client = client.with_emitter(Arc::new(emitter));
        event_printer = Some(tokio::spawn(print_events(rx)));
    }

    let sink: Arc<dyn TailSinkPort> =
        Arc::new(TerminalSink::new(out).with_labels(plan.labels));

    let mut sessions = Vec::with_capacity(plan.targets.len());
    for target in plan.targets {
        sessions.push(client.session(target, plan.initial_offset, Arc::clone(&sink))?);
    }

    let stop_tokens = sessions.iter().map(|s| s.stop_token()).collect::<Vec<_>>();
    let interrupt = tokio::spawn(async move {
        interrupt.await;
        info!("Interrupted, stopping sessions");
        for token in stop_tokens {
            token.cancel();
        }
    });

    for session in &mut sessions {
        debug!(phase = session.phase(), "Starting session");
        session.start();
    }

    let mut summaries = Vec::with_capacity(sessions.len());
    for session in sessions {
        summaries.push(session.wait().await?);
    }
    interrupt.abort();

    // The client holds the last sender; dropping it ends the printer.
    drop(client);
    if let Some(printer) = event_printer {
        let _ = printer.await;
    }

    for summary in &summaries {
        info!(
            phase = %summary.phase,
            reason = %summary.reason,
            final_offset = summary.final_offset,
            chunks = summary.chunks_applied,
            reconnects = summary.reconnects,
            "Session ended"
        );
    }
    Ok(summaries)
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<TailEvent>) {
    while let Some(event) = rx.recv().await {
        write_event(&mut std::io::stderr(), &event);
    }
}

fn write_event(out: &mut impl Write, event: &TailEvent) {
    match serde_json::to_string(event) {
        Ok(line) => {
            if let Err(e) = writeln!(out, "{line}") {
                warn!(error = %e, "Failed to write event");
            }
        }
        Err(e) => warn!(error = %e, "Failed to encode event"),
    }
}
