//! Desk configuration - program catalog and counting policy
//!
//! The config file is just a seating chart: no logic, only the programs on
//! offer, their capacities, and which head-count gates capacity checks.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::roster::program::Program;

/// Which head count is compared against `max_members` when gating
/// walk-ins, reassignments, and capacity edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// Only checked-in (Present) members occupy a seat.
    #[default]
    PresentOnly,
    /// Every assigned member occupies a seat, present or not.
    AllAssigned,
}

/// Desk configuration loaded at startup. Programs are fixed for the day;
/// only their `max_members` may change afterwards, through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Programs on offer, in display order.
    #[serde(default = "default_programs")]
    pub programs: Vec<Program>,

    /// Capacity counting policy.
    #[serde(default)]
    pub count_policy: CountPolicy,

    /// Program assigned to imported rows with a blank first choice.
    #[serde(default = "default_no_preference")]
    pub no_preference_program: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        DeskConfig {
            programs: default_programs(),
            count_policy: CountPolicy::default(),
            no_preference_program: default_no_preference(),
        }
    }
}

fn default_no_preference() -> String {
    "希望なし".to_string()
}

fn default_programs() -> Vec<Program> {
    vec![
        Program::new(
            1,
            "目指せ、最速ロボット！　～自動走行プログラミングにトライ～",
            8,
        ),
        Program::new(
            2,
            "電気の不思議を探ろう！　～LEDを回路の工夫で光らせよう～",
            25,
        ),
        Program::new(3, "ドローンで植物チェック！　～空から見守る緑の元気～", 20),
        Program::new(
            4,
            "“紙”技エンジニアリング！　～長さと強さの最大化に挑戦～",
            40,
        ),
        Program::new(5, "希望なし", 200),
    ]
}

impl DeskConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading desk configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)?;
        let config: DeskConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        config.validate()?;
        debug!(
            "Loaded {} programs, policy {:?}",
            config.programs.len(),
            config.count_policy
        );
        Ok(config)
    }

    /// Load from a file when one is given, otherwise fall back to the
    /// built-in catalog.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                info!("No desk configuration given, using built-in program catalog");
                Ok(Self::default())
            }
        }
    }

    /// Serialize back to YAML, for writing out a starter configuration.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.programs.is_empty() {
            return Err(Error::Config("no programs defined".to_string()));
        }
        let mut seen_ids = std::collections::HashSet::new();
        let mut seen_names = std::collections::HashSet::new();
        for program in &self.programs {
            if program.name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "program {} has an empty name",
                    program.id
                )));
            }
            if program.max_members < 1 {
                return Err(Error::Config(format!(
                    "program {} must allow at least 1 member",
                    program.name
                )));
            }
            if !seen_ids.insert(program.id) {
                return Err(Error::Config(format!("duplicate program id {}", program.id)));
            }
            if !seen_names.insert(program.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate program name {}",
                    program.name
                )));
            }
        }
        if !self
            .programs
            .iter()
            .any(|p| p.name == self.no_preference_program)
        {
            return Err(Error::Config(format!(
                "no-preference program {} is not in the catalog",
                self.no_preference_program
            )));
        }
        Ok(())
    }
}
