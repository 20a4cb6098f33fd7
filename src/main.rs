use clap::Parser;
use dotdot::cli::commands::Cli;
use dotdot::cli::handlers;
use dotdot::io::{config_io, logging, paths};

fn main() {
    let cli = Cli::parse();
    let config = config_io::load_config_or_default(&paths::config_path());
    if let Some(path) = logging::init_logging(&config.log) {
        tracing::info!(log = %path.display(), version = env!("CARGO_PKG_VERSION"), "dotdot starting");
    }

    if let Err(e) = handlers::dispatch(cli, &config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
