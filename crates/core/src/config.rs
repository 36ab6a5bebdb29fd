//! # Lessons Configuration
//!
//! Layered settings loading with figment, plus the per-request inputs of a
//! generation run.
//!
//! Configuration sources (highest wins):
//! 1. Environment variables (`LESSONS_AGENT_*` prefix, `__` as separator)
//! 2. Project-level `.lessons/config.json`
//! 3. Built-in defaults
//!
//! `LESSONS_AGENT_LLM__MODEL` maps to `llm.model`,
//! `LESSONS_AGENT_RESEARCH__MAX_STEPS` to `research.max_steps`, and so on.

use crate::error::{LessonError, Result};
use crate::models::ModelConfig;
use crate::schema::LearnerLevel;
use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "LESSONS_AGENT_";

/// Project-local settings file
pub const PROJECT_CONFIG_PATH: &str = ".lessons/config.json";

pub const DEFAULT_RESEARCH_GOALS: &str = "Build comprehensive lesson research notes.";
pub const DEFAULT_LESSON_GOALS: &str = "Create comprehensive lesson plans.";
pub const DEFAULT_AUDIENCE: &str = "General learners";

/// Search client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Valyu API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.valyu.ai/v1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Research phase budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchSettings {
    /// Maximum tool-invocation rounds for the research agent
    pub max_steps: u32,
    /// Wall-clock allowance per step
    pub seconds_per_step: u64,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_steps: 15,
            seconds_per_step: 30,
        }
    }
}

impl ResearchSettings {
    /// Total wall-clock budget for a research run with `max_steps` steps.
    pub fn budget(&self, max_steps: u32) -> Duration {
        Duration::from_secs(self.seconds_per_step.saturating_mul(u64::from(max_steps.max(1))))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonSettings {
    #[serde(default)]
    pub llm: ModelConfig,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub research: ResearchSettings,
}

impl LessonSettings {
    /// Load settings from defaults, the project file and the environment.
    ///
    /// Does not read `.env`; the binary loads it before calling this.
    pub fn load() -> Result<Self> {
        Self::figment(Path::new(PROJECT_CONFIG_PATH))
            .extract()
            .map_err(LessonError::from)
    }

    /// Build the provider chain with an explicit project file path.
    pub fn figment(project_file: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if project_file.exists() {
            figment = figment.merge(Json::file(PathBuf::from(project_file)));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

/// Inputs of one lesson generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub topic: String,
    pub level: LearnerLevel,
    pub audience: String,
    /// Number of lessons to produce
    pub num_lessons: u32,
    pub estimated_duration_minutes: u32,
    pub goals: String,
}

impl GenerationConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            level: LearnerLevel::default(),
            audience: DEFAULT_AUDIENCE.to_string(),
            num_lessons: 2,
            estimated_duration_minutes: 45,
            goals: DEFAULT_LESSON_GOALS.to_string(),
        }
    }

    pub fn with_level(mut self, level: LearnerLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_num_lessons(mut self, num_lessons: u32) -> Self {
        self.num_lessons = num_lessons;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = minutes;
        self
    }

    pub fn with_goals(mut self, goals: impl Into<String>) -> Self {
        self.goals = goals.into();
        self
    }

    /// Lesson count clamped to at least one.
    pub fn lesson_count(&self) -> usize {
        self.num_lessons.max(1) as usize
    }

    /// Research request for this run.
    pub fn research_request(&self, max_steps: u32) -> ResearchRequest {
        ResearchRequest {
            topic: self.topic.clone(),
            level: self.level,
            audience: self.audience.clone(),
            goals: self.goals.clone(),
            max_steps,
        }
    }
}

/// Inputs handed to the research capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub topic: String,
    pub level: LearnerLevel,
    pub audience: String,
    pub goals: String,
    pub max_steps: u32,
}

impl ResearchRequest {
    pub fn new(topic: impl Into<String>, level: LearnerLevel, audience: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            level,
            audience: audience.into(),
            goals: DEFAULT_RESEARCH_GOALS.to_string(),
            max_steps: ResearchSettings::default().max_steps,
        }
    }

    /// Query used when research falls back to a direct search.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.topic, self.goals).trim().to_string()
    }
}
