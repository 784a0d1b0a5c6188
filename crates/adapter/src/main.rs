use clap::Parser as _;
use petstore_mcp_adapter::config::AdapterArgs;
use petstore_mcp_adapter::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AdapterArgs::parse();
    telemetry::init(&args.log_level, args.log_json)?;
    petstore_mcp_adapter::run(args).await?;
    Ok(())
}
