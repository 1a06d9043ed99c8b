//! Moonlight Booth: a four-shot photo booth with framed strips and a
//! reaction recording, driven from the console.

mod app;
mod app_command;
mod config;
mod downloads;
mod error;
mod file_store;
mod frame_dump_recorder;
mod strip_font;
mod test_pattern_camera;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    downloads::Downloads,
    error::{AppError, Result as AppResult},
    file_store::FileStore,
    frame_dump_recorder::FrameDumpRecorder,
    strip_font::load_strip_font,
    test_pattern_camera::TestPatternCamera,
};

use crate::{app::RecorderFactory, config::Config};

use std::{
    io::{self, BufRead},
    panic::Location,
    sync::Arc,
};

use error_location::ErrorLocation;
use moonlight_booth_core::{ArtifactCache, RecorderBackend};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("moonlight_booth=debug,moonlight_booth_core=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let (command_tx, command_rx) = mpsc::channel(32);

        let cache = config.cache.enabled.then(|| {
            ArtifactCache::open(
                Arc::new(FileStore::new(config.cache.dir.clone())),
                config.cache.max_photo_bytes,
            )
        });
        let recorders: RecorderFactory =
            Arc::new(|| Box::new(FrameDumpRecorder::new()) as Box<dyn RecorderBackend>);

        let app = App::new(
            config,
            Arc::new(TestPatternCamera),
            recorders,
            cache,
            command_rx,
        );

        // Stdin is read on a blocking thread; the app shuts down when it closes.
        tokio::task::spawn_blocking(move || {
            if let Err(e) = forward_stdin(io::stdin().lock(), &command_tx) {
                info!(error = %e, "Console input stopped");
            }
        });

        if let Err(e) = app.run().await {
            error!(error = ?e, "App error");
        }
    });
}

/// Parses console lines into commands until input ends or the app stops
/// listening.
fn forward_stdin(input: impl BufRead, command_tx: &mpsc::Sender<AppCommand>) -> AppResult<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<AppCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };
        command_tx
            .blocking_send(command)
            .map_err(|e| AppError::ChannelSendFailed {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
    }
    Ok(())
}
