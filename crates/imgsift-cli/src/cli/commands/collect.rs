//! `imgsift collect` – run the fetch/dedup/store loop against one endpoint.

use anyhow::{Context, Result};
use imgsift_core::collect::{
    AttemptOutcome, AttemptReport, CollectionLoop, CollectionSummary, StopReason,
};
use imgsift_core::config::{self, ImgsiftConfig};
use imgsift_core::control::StopSignal;
use imgsift_core::fetch::HttpFetcher;
use imgsift_core::store::ContentStore;
use std::sync::Arc;

pub async fn run_collect(cfg: &ImgsiftConfig, endpoint: &str) -> Result<()> {
    let url = config::validate_endpoint(endpoint)?;
    let settings = cfg.collect_settings();

    let mut store = ContentStore::open(&cfg.store_dir)?;
    let root = std::fs::canonicalize(store.root()).unwrap_or_else(|_| store.root().to_path_buf());

    let stop = Arc::new(StopSignal::new());
    let mut fetcher = HttpFetcher::new(&cfg.http_options())?.with_stop(Arc::clone(&stop));

    println!("Collecting {} random image(s)", settings.target);
    println!("Endpoint:  {}", url);
    println!("Directory: {}", root.display());
    if !store.is_empty() {
        println!("Already stored: {}", store.len());
    }
    println!("{}", "-".repeat(50));

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel::<AttemptReport>();
    let printer = tokio::spawn(async move {
        while let Some(report) = progress_rx.recv().await {
            println!("{}", format_report(&report));
        }
    });

    let signal_stop = Arc::clone(&stop);
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping");
            signal_stop.request_stop();
        }
    });

    let collection = CollectionLoop::new(url.as_str(), settings)
        .with_stop(stop)
        .with_progress(progress_tx);
    // The loop sleeps and does blocking curl I/O; keep it off the async workers.
    let (summary, stored_total) = tokio::task::spawn_blocking(move || {
        let summary = collection.run(&mut fetcher, &mut store);
        (summary, store.len())
    })
    .await
    .context("collection task failed")?;

    signal_task.abort();
    // Sender was dropped with the loop, so the printer drains and exits.
    let _ = printer.await;

    println!();
    for line in format_summary(&summary, stored_total) {
        println!("{}", line);
    }
    println!("Saved in:  {}", root.display());
    Ok(())
}

/// One human-readable line per attempt.
fn format_report(report: &AttemptReport) -> String {
    let prefix = format!(
        "attempt {:>3} ({}/{})",
        report.attempt, report.successes, report.target
    );
    match &report.outcome {
        AttemptOutcome::Stored(image) => {
            format!("{}  stored {} ({} bytes)", prefix, image.file_name(), image.len)
        }
        AttemptOutcome::Duplicate(existing) => {
            format!("{}  already exists, skipped: {}", prefix, existing.file_name())
        }
        AttemptOutcome::Failed(e) => format!("{}  failed: {}", prefix, e),
    }
}

fn format_summary(summary: &CollectionSummary, stored_total: usize) -> Vec<String> {
    let headline = match summary.stop_reason {
        StopReason::TargetReached => "Done.".to_string(),
        StopReason::AttemptsExhausted => format!(
            "Gave up after {} attempts: the endpoint keeps returning images already stored.",
            summary.attempts
        ),
        StopReason::Interrupted => "interrupted".to_string(),
    };
    vec![
        headline,
        format!(
            "Stored:    {} new image(s) ({} in store)",
            summary.successes, stored_total
        ),
        format!(
            "Attempts:  {} ({} duplicate, {} failed) in {:.1}s",
            summary.attempts,
            summary.duplicates,
            summary.failures,
            summary.elapsed.as_secs_f64()
        ),
    ]
}
