//! Command handlers and their terminal output.

use crate::state::AppState;
use anyhow::Context;
use clearpath_core::{DetailOutcome, JobId, JobSnapshot, SourceId, SourceResult, TrademarkResult};
use clearpath_search::SearchRequest;
use std::time::Duration;
use tracing::debug;

const FOLLOW_INTERVAL: Duration = Duration::from_millis(500);

pub async fn search(
    state: &AppState,
    request: SearchRequest,
    follow: bool,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = &state.orchestrator;

    if !follow {
        let snapshot = orchestrator.search(&request).await?;
        return print_snapshot(&snapshot, json);
    }

    let (job, handle) = orchestrator.start(&request).await?;
    println!("job {} ({} sources)", job.id, job.requested_sources.len());

    let store = orchestrator.store();
    let mut seen = 0usize;
    loop {
        let finished = handle.is_finished();
        let fresh = store.list_results_since(&job.id, seen).await?;
        seen += fresh.len();
        for result in &fresh {
            print_result(result, json)?;
        }
        if finished {
            break;
        }
        tokio::time::sleep(FOLLOW_INTERVAL).await;
    }

    let status = handle.await.context("search task failed")?;
    debug!(job_id = %job.id, status = %status, "follow finished");

    let snapshot = store.get_job(&job.id).await?;
    if let Some(trademark) = &snapshot.trademark {
        print_trademark(trademark, json)?;
    }
    println!("status: {status}");
    Ok(())
}

pub async fn job(state: &AppState, id: &str, json: bool) -> anyhow::Result<()> {
    let id = JobId::new(id)?;
    let snapshot = state.orchestrator.store().get_job(&id).await?;
    print_snapshot(&snapshot, json)
}

pub async fn detail(
    state: &AppState,
    source: &str,
    file_number: &str,
    json: bool,
) -> anyhow::Result<()> {
    let source_id = SourceId::parse_lenient(source)?;
    let outcome = state.details.get_or_fetch(&source_id, file_number).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    match outcome {
        DetailOutcome::Found(detail) => {
            println!("{} {}", detail.source_id, detail.file_number);
            for (label, value) in [
                ("name", &detail.entity_name),
                ("type", &detail.entity_kind),
                ("formed", &detail.formation_date),
                ("agent", &detail.registered_agent),
            ] {
                if let Some(value) = value {
                    println!("  {label:<7}{value}");
                }
            }
            println!("  {:<7}{}", "url", detail.reference_url);
        }
        DetailOutcome::Failed { error, reference_url } => {
            println!("detail unavailable: {error}");
            println!("  see {reference_url}");
        }
    }
    Ok(())
}

pub fn sources(state: &AppState, json: bool) -> anyhow::Result<()> {
    let descriptors = state.orchestrator.registry().descriptors();
    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }
    for d in descriptors {
        println!(
            "{:<6}{:<40}{:<5}{:<6}{:.2}",
            d.id.as_str(),
            d.name,
            d.jurisdiction,
            d.kind.as_str(),
            d.source_weight
        );
    }
    Ok(())
}

fn print_snapshot(snapshot: &JobSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }
    let job = &snapshot.job;
    println!(
        "job {} \"{}\" ({}) status: {}",
        job.id, job.searched_name, job.entity_type, job.status
    );
    for result in &snapshot.results {
        print!("{}", format_result(result));
    }
    if let Some(trademark) = &snapshot.trademark {
        print!("{}", format_trademark(trademark));
    }
    Ok(())
}

fn print_result(result: &SourceResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else {
        print!("{}", format_result(result));
    }
    Ok(())
}

fn print_trademark(trademark: &TrademarkResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(trademark)?);
    } else {
        print!("{}", format_trademark(trademark));
    }
    Ok(())
}

fn format_result(result: &SourceResult) -> String {
    let mut out = format!(
        "{:<6}{:<10}{:.2} ({})  {}\n",
        result.source_id.as_str(),
        result.availability.as_str(),
        result.confidence,
        result.extraction_tier,
        result.notes
    );
    if !result.similar_names.is_empty() {
        out.push_str(&format!("      similar: {}\n", result.similar_names.join("; ")));
    }
    for flag in &result.flags {
        out.push_str(&format!("      {flag}\n"));
    }
    out
}

fn format_trademark(trademark: &TrademarkResult) -> String {
    format!("trademark risk: {}  {}\n", trademark.risk_level, trademark.notes)
}
