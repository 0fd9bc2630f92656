use crate::types::ToolState;
use crate::utils::truncate_str;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

#[derive(Debug)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub log_level: String,
    pub console_output: bool,
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".into(),
            log_level: "info".into(),
            console_output: true,
            file_output: false,
        }
    }
}

const CARD_WIDTH: usize = 70;
const CONTENT_WIDTH: usize = CARD_WIDTH - 11;

fn card_line(label: &str, value: &str) -> String {
    format!(
        "║ {:<7}{:<width$} ║",
        label,
        truncate_str(value, CONTENT_WIDTH),
        width = CONTENT_WIDTH
    )
}

fn preview_card(state: &ToolState) -> String {
    let border = "═".repeat(CARD_WIDTH - 2);
    let meta = &state.link_data;
    let image = meta.image_url().unwrap_or("N/A");

    [
        format!("╔{border}╗"),
        card_line("Link:", &state.link),
        card_line("Title:", meta.title_text().unwrap_or("N/A")),
        card_line("Desc:", meta.description_text().unwrap_or("N/A")),
        card_line("Image:", image),
        format!("╚{border}╝"),
    ]
    .join("\n")
}

/// Logs the saved state of a block as a boxed card.
pub fn log_preview_card(state: &ToolState) {
    info!("\n{}", preview_card(state));
}

fn error_card<E: Display + std::error::Error>(link: &str, error: &E) -> String {
    let border = "═".repeat(CARD_WIDTH - 2);
    let middle = "─".repeat(CARD_WIDTH - 2);

    let mut details = error.to_string();
    if let Some(source) = error.source() {
        details = format!("{details} (caused by: {source})");
    }

    [
        format!("╔{border}╗"),
        card_line("Link:", link),
        format!("║{middle}║"),
        card_line("Error:", &details),
        format!("╚{border}╝"),
    ]
    .join("\n")
}

/// Logs a failed paste attempt as a boxed card.
pub fn log_error_card<E: Display + std::error::Error>(link: &str, error: &E) {
    error!("\n{}", error_card(link, error));
}

/// Installs the global subscriber. Fails if one is already set.
pub fn setup_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers = Vec::new();

    if config.console_output {
        let console_layer = subscriber_fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_span_events(subscriber_fmt::format::FmtSpan::CLOSE);
        layers.push(console_layer.boxed());
    }

    if config.file_output {
        std::fs::create_dir_all(&config.log_dir)?;

        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "link-tool.log");

        let file_layer = subscriber_fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_writer(file_appender);

        layers.push(file_layer.boxed());
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    debug!("Logging system initialized with config: {:?}", config);
    Ok(())
}
