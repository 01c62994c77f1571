use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::hotkeys::CommandKind;

/// Per-host exceptions to the key table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRule {
    pub host: String,
    #[serde(default)]
    pub suppress: Vec<CommandKind>,
    #[serde(default)]
    pub fullscreen_selector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SitePolicy {
    pub rules: Vec<SiteRule>,
}

impl Default for SitePolicy {
    fn default() -> Self {
        Self {
            rules: vec![
                // Native arrow and F shortcuts mean something else there
                SiteRule {
                    host: "www.netflix.com".to_string(),
                    suppress: vec![
                        CommandKind::SeekForward,
                        CommandKind::SeekBackward,
                        CommandKind::FrameForward,
                    ],
                    fullscreen_selector: None,
                },
                SiteRule {
                    host: "www.bilibili.com".to_string(),
                    suppress: Vec::new(),
                    fullscreen_selector: Some("[data-text=\"进入全屏\"]".to_string()),
                },
                SiteRule {
                    host: "www.youtube.com".to_string(),
                    suppress: Vec::new(),
                    fullscreen_selector: Some("[class=\"ytp-fullscreen-button ytp-button\"]".to_string()),
                },
            ],
        }
    }
}

impl SitePolicy {
    pub fn rule_for(&self, host: &str) -> Option<&SiteRule> {
        self.rules.iter().find(|rule| rule.host.eq_ignore_ascii_case(host))
    }

    pub fn is_suppressed(&self, host: &str, kind: CommandKind) -> bool {
        self.rule_for(host)
            .map(|rule| rule.suppress.contains(&kind))
            .unwrap_or(false)
    }

    pub fn fullscreen_selector(&self, host: &str) -> Option<&str> {
        self.rule_for(host).and_then(|rule| rule.fullscreen_selector.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastTimings {
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    pub hide_ms: u64,
    pub reshow_ms: u64,
}

impl Default for ToastTimings {
    fn default() -> Self {
        Self {
            fade_in_ms: 50,
            fade_out_ms: 2000,
            hide_ms: 2500,
            reshow_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub playback_rate: String,
    pub play_progress: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            playback_rate: "player_enhance.playback_rate".to_string(),
            play_progress: "player_enhance.play_progress".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frame_rate: f64,
    pub seek_step_secs: f64,
    pub volume_step: f64,
    pub max_playback_rate: f64,
    pub progress_capacity: usize,
    pub record_interval_ms: u64,
    pub restore_delay_ms: u64,
    /// Restores at or below this position are applied without a notice.
    pub resume_notice_secs: f64,
    pub toast: ToastTimings,
    pub storage: StorageKeys,
    pub sites: SitePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            seek_step_secs: 3.0,
            volume_step: 0.01,
            max_playback_rate: 16.0,
            progress_capacity: 10,
            record_interval_ms: 2000,
            restore_delay_ms: 3000,
            resume_notice_secs: 3.0,
            toast: ToastTimings::default(),
            storage: StorageKeys::default(),
            sites: SitePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads engine settings from `config_path`. A missing file is created
    /// with defaults; an unreadable one is overwritten with defaults.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config
                .save_to(config_path)
                .map_err(|e| anyhow::anyhow!("Cannot write engine settings to {}: {}", config_path.display(), e))?;
            log::info!("Wrote default engine settings to {}", config_path.display());
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("Cannot read engine settings at {}: {}", config_path.display(), e))?;
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => {
                log::debug!("Engine settings read from {}", config_path.display());
                Ok(config)
            }
            Err(e) => {
                log::warn!("Engine settings at {} are invalid ({}), falling back to defaults", config_path.display(), e);
                let config = Self::default();
                config
                    .save_to(config_path)
                    .map_err(|e| anyhow::anyhow!("Cannot rewrite engine settings: {}", e))?;
                Ok(config)
            }
        }
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("player-enhance")
            .join("config.json")
    }

    pub fn frame_step_secs(&self) -> f64 {
        1.0 / self.frame_rate
    }

    pub fn record_interval(&self) -> Duration {
        Duration::from_millis(self.record_interval_ms)
    }

    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }
}
