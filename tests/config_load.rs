// tests/config_load.rs
use grip::config::{GripConfig, SourceKind, ENV_CAPACITY, ENV_CONFIG_PATH, ENV_DEADLINE_MS};
use grip::Engine;
use std::{env, fs, time::Duration};

#[serial_test::serial]
#[test]
fn load_from_path_then_env_overrides() {
    env::remove_var(ENV_DEADLINE_MS);
    env::remove_var(ENV_CAPACITY);

    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("grip.toml");
    fs::write(
        &p,
        r#"
default_query = "rust"

[engine]
deadline_ms = 1500
capacity = 10

[[sources]]
kind = "hackernews"
"#,
    )
    .unwrap();

    let cfg = GripConfig::load_from(&p).unwrap();
    assert_eq!(cfg.default_query, "rust");
    assert_eq!(cfg.engine.deadline_ms, 1500);
    assert_eq!(cfg.engine.capacity, 10);
    assert_eq!(cfg.sources.len(), 1);
    assert_eq!(cfg.sources[0].kind, SourceKind::Hackernews);

    env::set_var(ENV_DEADLINE_MS, "750");
    env::set_var(ENV_CAPACITY, "5");
    let cfg = GripConfig::load_from(&p).unwrap();
    env::remove_var(ENV_DEADLINE_MS);
    env::remove_var(ENV_CAPACITY);
    assert_eq!(cfg.engine.deadline_ms, 750);
    assert_eq!(cfg.engine.capacity, 5);

    let engine = Engine::from_config(&cfg).unwrap();
    assert_eq!(engine.ceiling(), Duration::from_millis(750));
    assert_eq!(engine.capacity(), 5);
    assert_eq!(engine.source_names(), vec!["Hacker News"]);
}

#[serial_test::serial]
#[test]
fn bad_env_override_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("grip.toml");
    fs::write(&p, "").unwrap();

    env::set_var(ENV_CAPACITY, "lots");
    let res = GripConfig::load_from(&p);
    env::remove_var(ENV_CAPACITY);
    assert!(res.is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_CONFIG_PATH);

    // 1) Nothing on disk → built-in defaults
    let cfg = GripConfig::load_default().unwrap();
    assert_eq!(cfg.sources.len(), 6);
    assert_eq!(cfg.engine.deadline_ms, 2_000);

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("grip.toml"), "default_query = \"zig\"").unwrap();
    assert_eq!(GripConfig::load_default().unwrap().default_query, "zig");

    // 3) Env wins over the fallback
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "default_query = \"elixir\"").unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(GripConfig::load_default().unwrap().default_query, "elixir");

    // 4) Env pointing nowhere is an error, not a silent fallback
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(GripConfig::load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}
