use clap::Parser;
use predict_client::cli::Cli;
use predict_client::error::Result;

mod main_dispatch;
mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = main_runtime::load_config(&cli.config)?;
    main_runtime::init_logging(&config.logging);

    if !main_dispatch::run(&cli, config).await? {
        std::process::exit(1);
    }

    Ok(())
}
