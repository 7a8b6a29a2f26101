//! `catalog` binary entry point.

use clap::Parser;

use catalog_app::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_app::init_tracing();

    let cli = Cli::parse();
    catalog_app::run(cli).await
}
