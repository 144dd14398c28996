use crate::config::Config;
use anyhow::{Context, Result};
use serde::Serialize;
use url::Url;

const SHEET_TITLE_PREFIX: &str = "Social_Report_";

/// Links to pre-built exports. Nothing is transformed on this path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLinks {
    pub xlsx_url: String,
    pub sheets_url: String,
}

pub fn export_links(config: &Config, period_start: &str) -> Result<ExportLinks> {
    let title = format!("{SHEET_TITLE_PREFIX}{period_start}");
    let sheets_url = Url::parse_with_params(&config.sheets_base_url, &[("title", title.as_str())])
        .with_context(|| format!("Invalid sheets_base_url: {}", config.sheets_base_url))?;

    Ok(ExportLinks {
        xlsx_url: config.xlsx_url.clone(),
        sheets_url: sheets_url.to_string(),
    })
}
