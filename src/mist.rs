//! Misexposure classification lookup
//!
//! The classifier writes `{"<pkg>": {"<component>": "<label>"}}`.

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Package → component → misexposure label
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MistMap(HashMap<String, HashMap<String, String>>);

impl MistMap {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let map = Self::from_json_str(&content)?;
        tracing::info!("Loaded mist result from: {}", path.as_ref().display());
        Ok(map)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Label of a component; `None` when the package or component is unknown
    pub fn label(&self, pkg_name: &str, comp_name: &str) -> Option<&str> {
        self.0
            .get(pkg_name)
            .and_then(|comps| comps.get(comp_name))
            .map(String::as_str)
    }

    pub fn package_count(&self) -> usize {
        self.0.len()
    }
}
