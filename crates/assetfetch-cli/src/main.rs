use assetfetch_lib::cli::{parse_args, resolve_command, run_ensure};
use assetfetch_lib::error::AssetFetchError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AssetFetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let params = resolve_command(args.command)?;
    run_ensure(params).await?;

    Ok(())
}
