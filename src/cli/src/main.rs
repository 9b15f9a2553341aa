//! Image content CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use image_content_cli::commands::{dispatch, load_config, Cli};
use image_content_cli::output::error_body;

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli, &config) {
        match e.downcast_ref::<image_content_core::ContentError>() {
            Some(content_error) => eprintln!("{}", error_body(content_error)),
            None => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
