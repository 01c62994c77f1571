#[cfg(test)]
mod tests {

    use crate::core::{EngineConfig, SitePolicy};
    use crate::hotkeys::CommandKind;

    fn temp_config_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("player-enhance-test-{}-{}", name, std::process::id()))
            .join("config.json")
    }

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.frame_rate, 30.0);
        assert_eq!(config.seek_step_secs, 3.0);
        assert_eq!(config.progress_capacity, 10);
        assert_eq!(config.record_interval_ms, 2000);
        assert_eq!(config.restore_delay_ms, 3000);
        assert_eq!(config.toast.fade_in_ms, 50);
        assert_eq!(config.toast.hide_ms, 2500);
    }

    #[test]
    fn test_default_site_policy() {
        let policy = SitePolicy::default();
        assert!(policy.is_suppressed("www.netflix.com", CommandKind::SeekForward));
        assert!(policy.is_suppressed("www.netflix.com", CommandKind::FrameForward));
        // Only forward stepping conflicts there
        assert!(!policy.is_suppressed("www.netflix.com", CommandKind::FrameBackward));
        assert!(!policy.is_suppressed("example.com", CommandKind::SeekForward));

        assert!(policy.fullscreen_selector("www.youtube.com").is_some());
        assert!(policy.fullscreen_selector("www.bilibili.com").is_some());
        assert!(policy.fullscreen_selector("www.netflix.com").is_none());
    }

    #[test]
    fn test_config_backward_compatibility() {
        // Older files without the newer fields still load
        let old_config_json = r#"{
            "frame_rate": 24.0,
            "sites": [
                { "host": "video.example.org", "suppress": ["seek_forward"] }
            ]
        }"#;

        let config: EngineConfig = serde_json::from_str(old_config_json).expect("Failed to parse old config");

        assert_eq!(config.frame_rate, 24.0);
        assert_eq!(config.progress_capacity, 10);
        assert_eq!(config.sites.rules.len(), 1);
        assert!(config.sites.is_suppressed("video.example.org", CommandKind::SeekForward));
        assert!(config.sites.rules[0].fullscreen_selector.is_none());
    }

    #[test]
    fn test_load_creates_default_file() {
        let path = temp_config_path("create");
        let _ = std::fs::remove_file(&path);

        let config = EngineConfig::load_from(&path).expect("load should create defaults");
        assert_eq!(config, EngineConfig::default());
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_replaces_malformed_file() {
        let path = temp_config_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let config = EngineConfig::load_from(&path).expect("malformed config falls back");
        assert_eq!(config, EngineConfig::default());

        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<EngineConfig>(&rewritten).is_ok());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_frame_step() {
        let config = EngineConfig::default();
        assert!((config.frame_step_secs() - 1.0 / 30.0).abs() < 1e-12);
    }
}
