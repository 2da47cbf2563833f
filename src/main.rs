mod app;
mod config;
mod error;
mod scene;

use std::env;

use config::Params;

/// Log filter used when `RUST_LOG` isn't set. Toggles and FPS are logged at info.
const DEFAULT_LOG_FILTER: &str = "info";

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();

    let params = Params::from_args(env::args().skip(1))?;
    log::info!("Starting with {:?}", params);

    app::run(params)?;

    return Ok(());
}
