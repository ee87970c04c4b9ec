use std::error::Error;

use clap::Parser;
use lib::skill::models::Args;
use lib::skill::server::{build_state, load_config, serve};
use log::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    /* Get config and resolve the school we answer for */
    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        "Read config.json from {}",
        std::path::absolute(&args.config_json_path)?.display()
    );
    let state = build_state(&config)?;

    serve(&config, state).await?;
    Ok(())
}
