use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use wardrobe::backend::config::{resolve_data_directory, AppConfig};
use wardrobe::backend::domain::{AlwaysConfirm, ImportConfirmation, NoticeSink};
use wardrobe::backend::initialize_backend;
use wardrobe::backend::io::{run_command, Cli, ConsoleConfirmation, ConsoleNoticeSink};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.validate()?;

    let data_directory = resolve_data_directory(cli.data_dir.clone())?;
    let config = AppConfig::load(&data_directory)?;
    wardrobe::init_logging(&config.log_level);
    info!("Using data directory {}", config.data_directory.display());

    let notices: Arc<dyn NoticeSink> = Arc::new(ConsoleNoticeSink);
    let confirmation: Arc<dyn ImportConfirmation> = if cli.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(ConsoleConfirmation)
    };

    let state = initialize_backend(config, notices.clone(), confirmation)?;
    let result = run_command(cli.command, &state, notices).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    state.shutdown()?;
    result
}
