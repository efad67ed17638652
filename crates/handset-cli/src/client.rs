//! Shared error type and per-invocation context for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use handset_sync::{
    HttpTransport, MutationOrchestrator, PageRequest, ResourceEndpoints, SoftDeleteViews,
    SyncConfig, SyncEntity, Transport,
};

use crate::cli::{Cli, ListArgs, OutputFormat};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Everything a command handler needs: validated configuration, the shared
/// transport, and the selected output format.
pub(crate) struct AppContext {
    pub(crate) config: SyncConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    pub(crate) fn from_cli(cli: &Cli) -> CliResult<Self> {
        let config = SyncConfig {
            api_base_url: cli.api_url.clone(),
            upload_base_url: cli.upload_url.clone(),
            timeout: Duration::from_secs(cli.timeout),
            default_page_size: cli.page_size,
            ..SyncConfig::default()
        };
        config
            .validate()
            .map_err(|err| CliError::validation(err.to_string()))?;
        let transport = HttpTransport::from_config(&config)
            .map_err(|err| CliError::failure(anyhow!("failed to prepare HTTP transport: {err}")))?;
        Ok(Self::with_transport(config, Arc::new(transport), cli.output))
    }

    pub(crate) fn with_transport(
        config: SyncConfig,
        transport: Arc<dyn Transport>,
        output: OutputFormat,
    ) -> Self {
        Self {
            config,
            transport,
            output,
        }
    }

    pub(crate) fn page(&self, args: &ListArgs) -> CliResult<PageRequest> {
        let size = args.size.unwrap_or(self.config.default_page_size);
        PageRequest::new(args.page, size).map_err(|err| CliError::validation(err.to_string()))
    }

    pub(crate) fn orchestrator<E: SyncEntity>(
        &self,
        endpoints: ResourceEndpoints,
    ) -> CliResult<MutationOrchestrator<E>> {
        let views = SoftDeleteViews::new(Arc::clone(&self.transport), endpoints, &self.config)
            .map_err(|err| CliError::validation(err.to_string()))?;
        Ok(MutationOrchestrator::new(Arc::clone(&self.transport), views))
    }
}
