//! Command handlers. Resource-specific modules build submissions; the helpers
//! here run the list/show/mutation flows shared by every resource.

pub(crate) mod categories;
pub(crate) mod dashboard;
pub(crate) mod phones;

use std::sync::Arc;

use anyhow::anyhow;
use handset_api_models::EntityId;
use handset_sync::{
    AssetBase, Mutation, PagedCollection, ResourceEndpoints, SyncEntity, ViewKind, fetch_by_id,
};

use crate::cli::ListArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{TableRow, render_mutation, render_page, render_record, report_warnings};

pub(crate) async fn list<E: SyncEntity + TableRow>(
    ctx: &AppContext,
    endpoints: ResourceEndpoints,
    view: ViewKind,
    args: &ListArgs,
) -> CliResult<()> {
    let page = ctx.page(args)?;
    let collection = PagedCollection::<E>::new(
        Arc::clone(&ctx.transport),
        Arc::new(endpoints),
        view,
        &ctx.config,
    )
    .map_err(|err| CliError::validation(err.to_string()))?;

    let report = collection.load(page).await.map_err(|err| {
        CliError::failure(anyhow!("failed to load {}: {err}", collection.label()))
    })?;
    report_warnings(&report.warnings);
    if report.fell_back {
        eprintln!(
            "note: page {} is empty; showing page {}",
            report.requested.index(),
            report.page.index()
        );
    }

    let state = collection.snapshot();
    render_page(
        &state.result.items,
        state.current_page,
        state.result.total_count,
        ctx.output,
    )
}

pub(crate) async fn show<E: SyncEntity + TableRow>(
    ctx: &AppContext,
    endpoints: &ResourceEndpoints,
    id: EntityId,
) -> CliResult<()> {
    let record: E = load_record(ctx, endpoints, id).await?;
    render_record(&record, ctx.output)
}

pub(crate) async fn load_record<E: SyncEntity>(
    ctx: &AppContext,
    endpoints: &ResourceEndpoints,
    id: EntityId,
) -> CliResult<E> {
    let assets = AssetBase::new(&ctx.config.upload_base_url);
    fetch_by_id(ctx.transport.as_ref(), endpoints, &assets, id)
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to load record {id}: {err}")))
}

/// Run one mutation, report its warnings, and render the outcome.
///
/// Reload failures after a successful mutation are printed as warnings; the
/// mutation itself has already been applied.
pub(crate) async fn mutate<E: SyncEntity>(
    ctx: &AppContext,
    endpoints: ResourceEndpoints,
    resource: &str,
    mutation: Mutation,
) -> CliResult<()> {
    let orchestrator = ctx.orchestrator::<E>(endpoints)?;
    let kind = mutation.kind();
    let report = orchestrator.perform(mutation).await.map_err(|err| {
        CliError::failure(anyhow!("{resource} {} failed: {err}", kind.as_str()))
    })?;

    report_warnings(&report.all_warnings());
    for error in report.settle.errors() {
        eprintln!("warning: view reload failed: {error}");
    }
    render_mutation(resource, report.kind, report.id, ctx.output)
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use handset_sync::{HttpTransport, SyncConfig};
    use httpmock::MockServer;

    use crate::cli::OutputFormat;
    use crate::client::AppContext;

    /// Context whose transport points at `server`.
    pub(crate) fn context_for(server: &MockServer) -> AppContext {
        let config = SyncConfig {
            api_base_url: server.url("/api/v1"),
            upload_base_url: server.url("/uploads"),
            ..SyncConfig::default()
        };
        let transport = HttpTransport::from_config(&config).expect("transport builds");
        AppContext::with_transport(config, Arc::new(transport), OutputFormat::Json)
    }
}
