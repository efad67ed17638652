use std::sync::Arc;

use anyhow::anyhow;
use handset_sync::{DEFAULT_PROBE_PATHS, collect_stats, probe};

use crate::cli::ProbeArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_probe, render_stats};

pub(crate) async fn handle_stats(ctx: &AppContext) -> CliResult<()> {
    let stats = collect_stats(Arc::clone(&ctx.transport), &ctx.config)
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to collect inventory totals: {err}")))?;
    render_stats(&stats, ctx.output)
}

/// Fails when no candidate answers, after rendering every attempt.
pub(crate) async fn handle_probe(ctx: &AppContext, args: ProbeArgs) -> CliResult<()> {
    let candidates: Vec<&str> = if args.paths.is_empty() {
        DEFAULT_PROBE_PATHS.to_vec()
    } else {
        args.paths.iter().map(String::as_str).collect()
    };

    let report = probe(ctx.transport.as_ref(), &candidates).await;
    render_probe(&report, ctx.output)?;
    if report.working.is_none() {
        return Err(CliError::failure(anyhow!(
            "none of {} candidate endpoint(s) answered",
            candidates.len()
        )));
    }
    Ok(())
}
