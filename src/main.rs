mod app;
mod cart;
mod cli;
mod config;
mod fetch;
mod menu;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // Logs go to stderr so command output stays pipeable.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = cli::Args::parse();

  let config = config::Config::load(args.config.as_deref())?;

  let app = app::App::new(config)?;
  app.run(args.command).await?;

  Ok(())
}
