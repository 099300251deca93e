// tests/config_load.rs
use std::{env, fs, path::PathBuf};

use stock_tracker::config::{
    TrackerConfig, ENV_CONFIG_PATH, ENV_FETCH_TIMEOUT_SECS, ENV_INTERVAL_MINUTES,
    ENV_POLITENESS_DELAY_SECS, ENV_STATE_PATH,
};

fn clear_env() {
    for k in [
        ENV_CONFIG_PATH,
        ENV_INTERVAL_MINUTES,
        ENV_POLITENESS_DELAY_SECS,
        ENV_FETCH_TIMEOUT_SECS,
        ENV_STATE_PATH,
    ] {
        env::remove_var(k);
    }
}

#[test]
fn toml_and_json_files_parse() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("tracker.toml");
    fs::write(
        &p_toml,
        r#"
interval_minutes = 5
politeness_delay_secs = 1

[[sites]]
name = "Crysp"
url = "https://crysp.co/"
"#,
    )
    .unwrap();
    let t = TrackerConfig::load_from(&p_toml).unwrap();
    assert_eq!(t.interval_minutes, 5);
    assert_eq!(t.politeness_delay_secs, 1);
    assert_eq!(t.sites.len(), 1);

    let p_json = dir.path().join("tracker.json");
    fs::write(
        &p_json,
        r#"{"sites":[{"name":"A","url":"https://a.example/"},{"name":"B","url":"https://b.example/"}]}"#,
    )
    .unwrap();
    let j = TrackerConfig::load_from(&p_json).unwrap();
    assert_eq!(j.sites[1].name, "B");
    assert_eq!(j.interval_minutes, 30);
}

#[test]
fn invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("tracker.toml");
    fs::write(
        &p,
        r#"
interval_minutes = 0
sites = []
"#,
    )
    .unwrap();
    assert!(TrackerConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing on disk -> built-in defaults.
    let d = TrackerConfig::load_default().unwrap();
    assert_eq!(d, TrackerConfig::default());

    // 2) ./config/tracker.toml fallback.
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("tracker.toml"),
        "[[sites]]\nname = \"Only\"\nurl = \"https://only.example/\"\n",
    )
    .unwrap();
    let f = TrackerConfig::load_default().unwrap();
    assert_eq!(f.sites.len(), 1);
    assert_eq!(f.sites[0].name, "Only");

    // 3) Env path wins; env overrides apply on top.
    let p_env = tmp.path().join("elsewhere.json");
    fs::write(&p_env, r#"{"sites":[{"name":"X","url":"https://x.example/"}]}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    env::set_var(ENV_INTERVAL_MINUTES, "7");
    env::set_var(ENV_STATE_PATH, "data/state.json");
    let e = TrackerConfig::load_default().unwrap();
    assert_eq!(e.sites[0].name, "X");
    assert_eq!(e.interval_minutes, 7);
    assert_eq!(e.state_path, PathBuf::from("data/state.json"));

    // 4) Env path to a missing file is an error.
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(TrackerConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
