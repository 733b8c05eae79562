use std::{fs, path::PathBuf, process::Command};

fn scenario_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "tile-defence-{name}-{}.toml",
        std::process::id()
    ));
    fs::write(&path, contents).expect("scenario written");
    path
}

#[test]
fn json_summary_reports_a_lost_session() {
    let path = scenario_file(
        "lost",
        r#"
            map = ["....", "PPPP", "...."]

            [config]
            starting_lives = 1

            [[config.waves]]
            [[config.waves.entries]]
            delay = 0.0
            kind = "fast"
            count = 2
            spacing = 0.5
        "#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_tile-defence"))
        .args(["--json", "--seconds", "10", "--scenario"])
        .arg(&path)
        .output()
        .expect("failed to run tile-defence");
    let _ = fs::remove_file(&path);

    assert!(output.status.success(), "{output:?}");
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds JSON");
    assert_eq!(summary["outcome"], "lost");
    assert_eq!(summary["lives"], 0);
    assert_eq!(summary["tally"]["escaped"], 1);
}

#[test]
fn missing_scenario_file_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_tile-defence"))
        .args(["--scenario", "/definitely/not/here.toml"])
        .output()
        .expect("failed to run tile-defence");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"), "{stderr}");
}

#[test]
fn rejects_non_positive_speed() {
    let output = Command::new(env!("CARGO_BIN_EXE_tile-defence"))
        .args(["--speed", "0", "--seconds", "1"])
        .output()
        .expect("failed to run tile-defence");

    assert!(!output.status.success());
}
