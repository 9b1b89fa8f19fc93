use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::model::Rgba;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct AppSettings {
    pub file_path: String,
    pub snap_to_grid: bool,
    pub grid_size: f32,
    pub default_group_title: String,
    pub default_group_color: Rgba,
    pub node_width: f32,
    pub node_height: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            file_path: "graph.json".to_string(),
            snap_to_grid: true,
            grid_size: 16.0,
            default_group_title: "New Group".to_string(),
            default_group_color: Rgba {
                r: 60,
                g: 60,
                b: 70,
                a: 160,
            },
            node_width: 140.0,
            node_height: 56.0,
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "toml")
}

/// Reads TOML or JSON, trying the other format when the extension's fails.
pub(super) fn load_settings(path: &Path) -> Result<AppSettings> {
    let s = error::read_to_string(path)?;
    if is_toml(path) {
        match toml::from_str::<AppSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => serde_json::from_str(&s).map_err(|_| e.into()),
        }
    } else {
        match serde_json::from_str::<AppSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => toml::from_str(&s).map_err(|_| e.into()),
        }
    }
}

pub(super) fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    let text = if is_toml(path) {
        toml::to_string_pretty(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    error::write(path, text)
}
