use std::{collections::BTreeMap, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_duration() -> u32 { 72 }

fn default_level() -> String { "NARANJA".to_string() }

/// Metadata of a weather advisory (aviso) as published with its layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub numero_aviso: u32,
    #[serde(default = "default_duration")]
    pub duracion_horas: u32,
    #[serde(default = "default_level")]
    pub nivel: String,
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub link_shp_dia1: Option<String>,
    #[serde(default)]
    pub link_shp_dia2: Option<String>,
    #[serde(default)]
    pub link_shp_dia3: Option<String>,
}

impl Advisory {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(format!("invalid advisory JSON: {e}")))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::load(path, format!("cannot read advisory: {e}")))?;
        Self::from_json_str(&text)
    }

    /// Number of forecast days the event spans: up to 24 h is one day,
    /// up to 48 h two, anything longer three.
    pub fn day_count(&self) -> u8 {
        match self.duracion_horas {
            0..=24 => 1,
            25..=48 => 2,
            _ => 3,
        }
    }

    /// Published download link of a day's layer archive.
    pub fn link(&self, day: u8) -> Option<&str> {
        match day {
            1 => self.link_shp_dia1.as_deref(),
            2 => self.link_shp_dia2.as_deref(),
            3 => self.link_shp_dia3.as_deref(),
            _ => None,
        }
    }

    /// Layer files `{root}/aviso_{n}/dia{d}/view_aviso.shp` for the event's
    /// days; days whose file is absent are left out with a warning.
    pub fn day_layers(&self, root: &Path) -> BTreeMap<u8, PathBuf> {
        (1..=self.day_count())
            .filter_map(|day| {
                let path = root.join(format!("aviso_{}", self.numero_aviso))
                    .join(format!("dia{day}"))
                    .join("view_aviso.shp");
                if path.is_file() {
                    Some((day, path))
                } else {
                    log::warn!("[advisory] {}: no layer for day {day} at {}", self.numero_aviso, path.display());
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_day_count() {
        let advisory = Advisory::from_json_str(r#"{"numero_aviso": 245, "titulo": "Lluvias"}"#).unwrap();
        assert_eq!(advisory.duracion_horas, 72);
        assert_eq!(advisory.nivel, "NARANJA");
        assert_eq!(advisory.day_count(), 3);

        let short = Advisory { duracion_horas: 24, ..advisory.clone() };
        assert_eq!(short.day_count(), 1);
        let medium = Advisory { duracion_horas: 36, ..advisory };
        assert_eq!(medium.day_count(), 2);
    }

    #[test]
    fn day_layers_only_lists_existing_files() {
        let root = tempfile::tempdir().unwrap();
        for day in [1, 3] {
            let dir = root.path().join(format!("aviso_9/dia{day}"));
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("view_aviso.shp"), b"").unwrap();
        }
        let advisory = Advisory::from_json_str(r#"{"numero_aviso": 9, "duracion_horas": 60}"#).unwrap();
        let layers = advisory.day_layers(root.path());
        assert_eq!(layers.keys().copied().collect::<Vec<_>>(), [1, 3]);
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert_eq!(Advisory::from_json_str("{}").unwrap_err().kind(), crate::ErrorKind::ConfigError);
    }
}
