//! Terminal rendering of the loading, error and reading states.

use super::theme::{Palette, Rgb};
use crate::error::Result;
use crate::models::{AirQualityReading, AqiLevel};
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const LOADING_MESSAGE: &str = "Loading air quality data...";
pub const FETCH_ERROR_MESSAGE: &str = "Unable to fetch air quality data. Please try again.";
pub const LOCATION_ERROR_MESSAGE: &str = "Unable to get location. Please try again.";

/// Applies a palette color to `text`.
pub fn paint(text: &str, color: Rgb) -> ColoredString {
    text.truecolor(color.0, color.1, color.2)
}

fn cell_color(color: Rgb) -> Color {
    Color::Rgb {
        r: color.0,
        g: color.1,
        b: color.2,
    }
}

/// Starts the spinner shown while a fetch is outstanding. Call `finish_and_clear` when done.
pub fn loading_spinner(palette: &Palette) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(paint(LOADING_MESSAGE, palette.text).to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// `"Unknown Location"` when the station has no name.
pub fn station_label(reading: &AirQualityReading) -> &str {
    if reading.station.is_empty() {
        "Unknown Location"
    } else {
        &reading.station
    }
}

/// Zero means "no value" for every stat on the card, so it renders as `-`.
pub fn stat_value(value: f64, unit: &str) -> String {
    if value == 0.0 {
        format!("-{}", unit)
    } else {
        format!("{}{}", value, unit)
    }
}

pub fn aqi_value(aqi: i64) -> String {
    if aqi == 0 {
        "-".to_string()
    } else {
        aqi.to_string()
    }
}

/// The station's update time in local time, or `-` when missing or unparseable.
pub fn last_update_label(last_update: &str) -> String {
    DateTime::parse_from_rfc3339(last_update)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| "-".to_string())
}

/// Builds the reading card.
pub fn reading_table(reading: &AirQualityReading, palette: &Palette) -> Table {
    let level = AqiLevel::from_aqi(reading.aqi);
    let level_color = Rgb::from_hex(level.color_hex()).unwrap_or(palette.text);

    let label = |text: &str| Cell::new(text).fg(cell_color(palette.sub_text));
    let value = |text: String| {
        Cell::new(text)
            .fg(cell_color(palette.text))
            .set_alignment(CellAlignment::Right)
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(station_label(reading))
                .fg(cell_color(palette.text))
                .add_attribute(Attribute::Bold),
            Cell::new("Air Quality Index").fg(cell_color(palette.sub_text)),
        ]);
    table.add_row(vec![
        label("AQI"),
        Cell::new(aqi_value(reading.aqi))
            .fg(cell_color(level_color))
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        label("Status"),
        Cell::new(level.label())
            .fg(cell_color(level_color))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![label("Temperature"), value(stat_value(reading.temperature, "°C"))]);
    table.add_row(vec![label("Humidity"), value(stat_value(reading.humidity, "%"))]);
    table.add_row(vec![
        label("Last updated"),
        value(last_update_label(&reading.last_update)),
    ]);
    table
}

pub fn print_reading(reading: &AirQualityReading, palette: &Palette) {
    println!("{}", reading_table(reading, palette));
}

pub fn print_error(message: &str, palette: &Palette) {
    println!("{} {}", paint("⚠", palette.error), paint(message, palette.text));
}
