use super::*;

#[test]
fn test_partial_toml_uses_defaults() {
    let config = GameConfig::from_toml(
        r#"
        [engine]
        path = "/opt/kalmia/Kalmia"
        args = ["--quiet"]

        [player]
        playout = 800
        "#,
    )
    .unwrap();

    assert_eq!(config.engine.path, PathBuf::from("/opt/kalmia/Kalmia"));
    assert_eq!(config.engine.args, vec!["--quiet".to_string()]);
    assert_eq!(config.engine.quit_timeout(), Duration::from_secs(10));
    assert_eq!(config.player.playout, 800);
    assert!(config.player.reuse_subtree);
    assert_eq!(config.evaluator, EvaluatorOptions::default());
    assert_eq!(config.game.suspend_timeout(), Duration::from_secs(10));
}

#[test]
fn test_work_dir_defaults_to_executable_dir() {
    let config = EngineConfig::new("/opt/kalmia/Kalmia");
    assert_eq!(config.resolved_work_dir(), Some(PathBuf::from("/opt/kalmia")));

    let bare = EngineConfig::new("Kalmia");
    assert_eq!(bare.resolved_work_dir(), None);

    let explicit = EngineConfig {
        work_dir: Some(PathBuf::from("/tmp")),
        ..EngineConfig::new("/opt/kalmia/Kalmia")
    };
    assert_eq!(explicit.resolved_work_dir(), Some(PathBuf::from("/tmp")));
}

#[test]
fn test_save_and_load() {
    let path = std::env::temp_dir().join(format!("kalmia_config_{}.toml", std::process::id()));
    let mut config = GameConfig::default();
    config.player.softmax_temperature = 0.5;
    config.engine.quit_timeout_ms = 250;

    config.save(&path).unwrap();
    let loaded = GameConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, config);
}

#[test]
fn test_option_pairs_are_lowercase() {
    let pairs = EngineOptions::default().to_pairs();
    assert_eq!(pairs.len(), 10);
    assert!(pairs.contains(&("reuse_subtree", "true".to_string())));
    assert!(pairs.contains(&("endgame_move_num", "-1".to_string())));
}

#[test]
fn test_load_missing_file() {
    let err = GameConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
