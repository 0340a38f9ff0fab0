use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use dioxus::prelude::*;
use tracing_subscriber::EnvFilter;

mod app;
mod domain;
mod infra;
mod platform;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use crate::app::App;
use crate::domain::entities::record::FieldValue;

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const PAGE_SIZE_CHOICES: [usize; 4] = [10, 25, 50, 100];
pub const NONE_OPTION_VALUE: &str = "__none__";
/// Stamped into a flag's audit fields on toggle until real accounts exist.
pub const ADMIN_ACTOR: &str = "console-admin";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Content Desk"))
                .with_data_directory(webview_data_dir),
        )
        .launch(App);
}

/// Store location: `CONTENT_DESK_DB` when set, the per-user data directory
/// otherwise.
pub fn default_db_path() -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var("CONTENT_DESK_DB") {
        if !override_path.trim().is_empty() {
            return Ok(PathBuf::from(override_path));
        }
    }
    let project_dirs = ProjectDirs::from("com", "contentdesk", "content-desk")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("collections.sqlite"))
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

fn default_webview_data_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "contentdesk", "content-desk")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    ensure_webview_data_dir(project_dirs.data_local_dir())
}

/// Form inputs arrive as plain text; map them onto field values. Booleans and
/// numbers are recognized, everything else stays text.
pub fn parse_input_value(text: &str) -> FieldValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FieldValue::Null;
    }
    match trimmed {
        "true" => return FieldValue::Bool(true),
        "false" => return FieldValue::Bool(false),
        _ => {}
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return FieldValue::Number(number);
    }
    FieldValue::Text(trimmed.to_string())
}
