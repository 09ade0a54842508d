use crate::generator::GeneratorConfig;
use anyhow::Context;
use migrationcore::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the driver takes its records from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Sample,
    Csv {
        path: PathBuf,
    },
    Synthetic(GeneratorConfig),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub source: DataSource,
    /// Subjects to display; empty shows every subject.
    pub subjects: Vec<String>,
    pub session: SessionConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_source(source: DataSource) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        self.session.clone()
    }
}
