//! Engine bridge settings.
//!
//! Every field has a default, so a JSON file only needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;

pub const MAX_SKILL_LEVEL: u8 = 20;

/// Search depth used once the doubled skill level reaches this value.
const FULL_STRENGTH_DEPTH: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Single thread, NNUE evaluation disabled.
    #[default]
    Classical,
    Nnue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub engine_path: String,
    pub skill_level: u8,
    pub analysis_type: AnalysisType,
    pub ponder: bool,
    /// Overrides the depth derived from `skill_level`.
    pub fixed_depth: Option<u32>,
    /// Overrides the CPU-derived thread count in NNUE mode.
    pub threads: Option<usize>,
    /// Centipawn magnitude that maps to the ends of the display range.
    pub eval_cap_cp: i32,
    pub progress_depth_step: u32,
    pub progress_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine_path: "stockfish".to_owned(),
            skill_level: MAX_SKILL_LEVEL,
            analysis_type: AnalysisType::Classical,
            ponder: true,
            fixed_depth: None,
            threads: None,
            eval_cap_cp: 500,
            progress_depth_step: 3,
            progress_interval_ms: 3000,
        }
    }
}

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BridgeError> {
        let config: BridgeConfig =
            serde_json::from_str(json).map_err(|err| BridgeError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.engine_path.trim().is_empty() {
            return Err(BridgeError::InvalidConfig("engine path is empty".to_owned()));
        }
        if self.skill_level > MAX_SKILL_LEVEL {
            return Err(BridgeError::InvalidConfig(format!(
                "skill level {} is above {MAX_SKILL_LEVEL}",
                self.skill_level
            )));
        }
        if self.eval_cap_cp <= 0 {
            return Err(BridgeError::InvalidConfig("evaluation cap must be positive".to_owned()));
        }
        if self.fixed_depth == Some(0) || self.threads == Some(0) {
            return Err(BridgeError::InvalidConfig("depth and threads must be at least 1".to_owned()));
        }
        Ok(())
    }

    pub fn search_depth(&self) -> u32 {
        self.fixed_depth.unwrap_or_else(|| depth_for_skill(self.skill_level))
    }

    pub fn thread_count(&self) -> usize {
        match self.analysis_type {
            AnalysisType::Classical => 1,
            AnalysisType::Nnue => self.threads.unwrap_or_else(|| nnue_threads(num_cpus::get())),
        }
    }

    /// `setoption` pairs pushed during the handshake, in order.
    pub fn engine_options(&self) -> Vec<(&'static str, String)> {
        let mut options = vec![("Ponder", self.ponder.to_string())];
        options.push(("Skill Level", self.skill_level.to_string()));
        options.extend(analysis_options(self));
        options
    }
}

/// `Threads` and `Use NNUE` for the configured analysis type.
pub fn analysis_options(config: &BridgeConfig) -> [(&'static str, String); 2] {
    [
        ("Threads", config.thread_count().to_string()),
        (
            "Use NNUE",
            (config.analysis_type == AnalysisType::Nnue).to_string(),
        ),
    ]
}

/// Depth for a 0..=20 skill level: shallow searches for weak play, then a
/// jump to full depth.
pub fn depth_for_skill(skill_level: u8) -> u32 {
    let doubled = u32::from(skill_level) * 2;
    if doubled < 15 {
        (doubled + 1).div_ceil(5)
    } else {
        FULL_STRENGTH_DEPTH
    }
}

/// CPU count rounded down to an even number, at least one.
pub fn nnue_threads(cpus: usize) -> usize {
    (cpus - cpus % 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::{depth_for_skill, nnue_threads, AnalysisType, BridgeConfig};
    use crate::errors::BridgeError;

    #[test]
    fn depth_grows_with_skill_then_jumps() {
        assert_eq!(depth_for_skill(0), 1);
        assert_eq!(depth_for_skill(2), 1);
        assert_eq!(depth_for_skill(3), 2);
        assert_eq!(depth_for_skill(7), 3);
        assert_eq!(depth_for_skill(8), 22);
        assert_eq!(depth_for_skill(20), 22);
    }

    #[test]
    fn nnue_threads_are_even() {
        assert_eq!(nnue_threads(1), 1);
        assert_eq!(nnue_threads(2), 2);
        assert_eq!(nnue_threads(7), 6);
        assert_eq!(nnue_threads(16), 16);
    }

    #[test]
    fn json_overrides_only_named_fields() {
        let config = BridgeConfig::from_json_str(
            r#"{ "skill_level": 3, "analysis_type": "nnue", "threads": 4 }"#,
        )
        .expect("valid config");
        assert_eq!(config.engine_path, "stockfish");
        assert_eq!(config.search_depth(), 2);
        assert_eq!(config.thread_count(), 4);
        assert_eq!(config.analysis_type, AnalysisType::Nnue);

        let options = config.engine_options();
        assert_eq!(options[0], ("Ponder", "true".to_owned()));
        assert_eq!(options[1], ("Skill Level", "3".to_owned()));
        assert_eq!(options[3], ("Use NNUE", "true".to_owned()));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for json in [
            r#"{ "skill_level": 21 }"#,
            r#"{ "engine_path": " " }"#,
            r#"{ "eval_cap_cp": 0 }"#,
            r#"{ "fixed_depth": 0 }"#,
            r#"{ "skill_level": "high" }"#,
        ] {
            assert!(
                matches!(BridgeConfig::from_json_str(json), Err(BridgeError::InvalidConfig(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn classical_analysis_uses_one_thread() {
        let config = BridgeConfig::default();
        assert_eq!(config.thread_count(), 1);
        assert_eq!(config.search_depth(), 22);
    }
}
