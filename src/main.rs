use chirp_server::{start_chirp_server, CmdArgs};
use chirp_utils::error::ChirpResult;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> ChirpResult<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();

  let args = CmdArgs::parse();

  start_chirp_server(args).await?;
  Ok(())
}
