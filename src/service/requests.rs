// src/service/requests.rs

use crate::models::{Frequency, HabitType};
use serde::Deserialize;

fn default_daily_target() -> u32 {
    1
}

/// Fields supplied when creating a habit. Id, creation time and archive flag
/// are assigned by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub life_significance: Option<String>,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub custom_days: Option<Vec<u32>>,
    #[serde(rename = "type", default)]
    pub habit_type: HabitType,
    #[serde(default = "default_daily_target")]
    pub daily_target: u32,
    /// Checklist titles; only stored for quit habits.
    #[serde(default)]
    pub coping_steps: Vec<String>,
}

/// Partial habit update. `None` keeps the current value; an empty note clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub life_significance: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub frequency: Option<Frequency>,
    pub custom_days: Option<Vec<u32>>,
    #[serde(rename = "type")]
    pub habit_type: Option<HabitType>,
    pub daily_target: Option<u32>,
    /// Replaces the whole checklist when present.
    pub coping_steps: Option<Vec<String>>,
}
