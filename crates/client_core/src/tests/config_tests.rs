use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_config(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("course_actions_config_{suffix}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn api_root_strips_trailing_slash() {
    let settings = ClientSettings {
        base_url: "https://learn.example.com/".into(),
        ..ClientSettings::default()
    };
    assert_eq!(
        settings.api_root().expect("root"),
        "https://learn.example.com"
    );

    let settings = ClientSettings {
        base_url: "https://learn.example.com/app/".into(),
        ..ClientSettings::default()
    };
    assert_eq!(
        settings.api_root().expect("root"),
        "https://learn.example.com/app"
    );
}

#[test]
fn api_root_drops_query_and_fragment() {
    let settings = ClientSettings {
        base_url: "http://learn.example.com/?a=1".into(),
        ..ClientSettings::default()
    };
    assert_eq!(settings.api_root().expect("root"), "http://learn.example.com");

    let settings = ClientSettings {
        base_url: "http://learn.example.com/app/?next=/x#top".into(),
        ..ClientSettings::default()
    };
    assert_eq!(
        settings.api_root().expect("root"),
        "http://learn.example.com/app"
    );
}

#[test]
fn api_root_rejects_garbage() {
    let settings = ClientSettings {
        base_url: "not a url".into(),
        ..ClientSettings::default()
    };
    assert!(settings.api_root().is_err());

    let settings = ClientSettings {
        base_url: "mailto:someone@example.com".into(),
        ..ClientSettings::default()
    };
    assert!(settings.api_root().is_err());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        r#"
base_url = "https://courses.example.org"
csrf_cookie_name = "csrf"
"#,
    );

    let settings = load_settings(Some(path.as_path())).expect("load");
    assert_eq!(settings.base_url, "https://courses.example.org");
    assert_eq!(settings.csrf_cookie_name, "csrf");
    assert_eq!(settings.csrf_header, CSRF_HEADER);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let path = env::temp_dir().join("course_actions_config_does_not_exist.toml");
    assert!(load_settings(Some(path.as_path())).is_err());
}

#[test]
fn overrides_apply_only_present_keys() {
    let mut settings = ClientSettings::default();
    apply_overrides(&mut settings, |key| {
        (key == "session_file").then(|| "/tmp/tokens.json".to_string())
    });
    assert_eq!(settings.session_file, "/tmp/tokens.json");
    assert_eq!(settings.base_url, ClientSettings::default().base_url);
}
