mod api;
mod cli;
mod config;
mod db;
mod error;
mod fetcher;
mod location;
mod models;
mod ui;

use clap::Parser;
use cli::{App, Cli, Screen};
use config::Config;
use dialoguer::{theme::ColorfulTheme, Select};
use error::Result;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up stderr logging, plus a daily rolling log file when `AQI_LOG_DIR` is set.
///
/// The returned guard flushes the file writer on drop and must be held until exit.
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(stderr_layer);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "aqi-monitor.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        },
        None => {
            registry.init();
            None
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // The log directory is part of the config, so loading it can't be logged yet.
    let config = Config::from_env()?;
    let _log_guard = init_logging(&config);

    info!("Initializing air quality monitor...");
    debug!("Loaded configuration: {}", config.summary());

    let mut app = match App::new(&config).await {
        Ok(app) => {
            info!("Application initialized successfully.");
            app
        },
        Err(e) => {
            error!("Failed to initialize application: {:?}", e);
            eprintln!("Error: Failed to initialize application: {}", e);
            return Err(e);
        },
    };

    if let Some(command) = cli.command {
        return app.run_command(command).await;
    }

    // Interactive mode: show the reading, then offer refresh / theme / exit.
    let mut screen = app.refresh_with_spinner().await?;
    loop {
        println!();
        app.render(&screen);
        println!();

        let options: &[&str] = match screen {
            Screen::Reading(_) => &["Refresh", "Toggle theme", "Exit"],
            Screen::Error(_) => &["Try again", "Toggle theme", "Exit"],
        };

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(options)
            .default(0)
            .interact_opt()? // Esc / q cancels
            .unwrap_or(options.len() - 1); // Default to Exit if cancelled

        match selection {
            0 => {
                if let Screen::Error(_) = screen {
                    // Re-read the location as well, it may be what failed.
                    app.reset_location();
                }
                screen = app.refresh_with_spinner().await?;
            },
            1 => {
                let theme = app.toggle_theme().await;
                println!(
                    "{} {}",
                    ui::paint("Theme set to", app.palette().sub_text),
                    ui::paint(theme.as_str(), app.palette().warning)
                );
            },
            _ => {
                println!("{}", ui::paint("Goodbye!", app.palette().success));
                break;
            },
        }
    }

    Ok(())
}
