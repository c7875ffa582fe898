use super::{load_settings_from, parse_origin_list, Settings, SETTINGS_FILE};

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_root(label: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let root = env::temp_dir().join(format!("expense_server_{label}_{suffix}"));
    fs::create_dir_all(&root).expect("temp root");
    root
}

#[test]
fn splits_and_normalizes_origin_lists() {
    assert_eq!(
        parse_origin_list(" http://a.local/ ,, http://b.local"),
        vec!["http://a.local".to_string(), "http://b.local".to_string()]
    );
}

#[test]
fn defaults_apply_without_file_or_environment() {
    let root = temp_root("defaults");
    let settings = load_settings_from(&root.join(SETTINGS_FILE), |_| None).expect("settings");
    assert_eq!(settings, Settings::default());
    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn app_prefixed_bind_wins_over_file_and_plain_env() {
    let root = temp_root("bind");
    let path = root.join(SETTINGS_FILE);
    fs::write(
        &path,
        "bind_addr = \"0.0.0.0:9000\"\nallowed_origins = [\"http://dash.local\"]\n",
    )
    .expect("write");

    let from_file = load_settings_from(&path, |_| None).expect("settings");
    assert_eq!(from_file.server_bind, "0.0.0.0:9000");
    assert_eq!(from_file.allowed_origins, vec!["http://dash.local".to_string()]);

    let overridden = load_settings_from(&path, |key| match key {
        "SERVER_BIND" => Some("127.0.0.1:7000".to_string()),
        "APP__BIND_ADDR" => Some("127.0.0.1:7001".to_string()),
        _ => None,
    })
    .expect("settings");
    assert_eq!(overridden.server_bind, "127.0.0.1:7001");

    fs::remove_dir_all(root).expect("cleanup");
}
