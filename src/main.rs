mod cli;
mod config;
mod core;
mod error;
mod models;
mod server;
mod sources;

#[cfg(test)]
mod test_utils;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    let cfg = config::load_config();

    let default_level = if cfg.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = cli::run(cli, cfg) {
        eprintln!("오류: {:#}", e);
        std::process::exit(1);
    }
}
