use crate::cli::EnsureParams;
use crate::error::AssetFetchError;
use crate::fetch::{AssetFetcher, EnsureOutcome};
use crate::manifest::AssetSet;
use crate::transport::{RoutingTransport, Transport};

/// Ensures every asset set in turn, stopping at the first failure.
pub async fn ensure_all<T: Transport>(
    fetcher: &AssetFetcher<T>,
    asset_sets: &[AssetSet],
) -> Result<Vec<EnsureOutcome>, AssetFetchError> {
    let mut outcomes = Vec::with_capacity(asset_sets.len());
    for asset_set in asset_sets {
        let outcome = fetcher.ensure(asset_set).await.inspect_err(|err| {
            tracing::error!(asset_set = %asset_set.id, kind = %err.kind(), "{err}");
        })?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

pub async fn run_ensure(params: EnsureParams) -> Result<(), AssetFetchError> {
    let EnsureParams { app_config } = params;

    let transport = RoutingTransport::from_config(&app_config.transport)?;
    let fetcher = AssetFetcher::new(transport);

    tracing::info!("Ensuring {} asset set(s)...", app_config.asset_sets.len());
    let outcomes = ensure_all(&fetcher, &app_config.asset_sets).await?;

    let fetched = outcomes
        .iter()
        .filter(|o| matches!(o, EnsureOutcome::Fetched { .. }))
        .count();
    tracing::info!(
        "All asset sets present ({} fetched, {} already present)",
        fetched,
        outcomes.len() - fetched
    );
    Ok(())
}
