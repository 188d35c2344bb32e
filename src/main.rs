mod api;
mod config;
mod replay;
mod services;
mod workspace;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::http::HttpApi;
use crate::config::Config;
use crate::workspace::Workspace;

const USAGE: &str = "usage: boxmark <script.jsonl>";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args_os().skip(1);
    let (Some(script), None) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(PathBuf::from(script)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "boxmark failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(script: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let events = replay::load_script(&script).await?;

    let api = Arc::new(HttpApi::new(&config.api_url, config.timeouts)?);
    let mut workspace = Workspace::connect(api, &config).await?;
    info!(api_url = %config.api_url, images = workspace.images().len(), events = events.len(), "boxmark starting");

    if workspace.images().is_empty() {
        warn!("no images available; replaying without an open image");
    } else {
        workspace.open(0).await?;
    }

    let summary = replay::run(&mut workspace, &events).await?;
    info!(
        events = summary.events,
        failed = summary.failed,
        image = summary.image.as_ref().map_or("none", |id| id.as_str()),
        index = ?workspace.current_index(),
        boxes = summary.boxes,
        draw_ops = workspace.frame().len(),
        renders = workspace.render_count(),
        cursor = workspace.cursor().as_css(),
        "replay complete"
    );
    Ok(())
}
