//! Install-root fixture driving the `bctheme` binary.

use std::path::PathBuf;
use std::time::Instant;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|err| panic!("stdout is not JSON ({err}):\n{}", self.stdout))
    }
}

pub struct E2EFixture {
    pub scenario: String,
    pub temp_dir: TempDir,
    pub root: PathBuf,
    started: Instant,
    step: usize,
}

impl E2EFixture {
    pub fn new(scenario: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("root");
        println!("[E2E] {scenario}: root {}", root.display());
        Self {
            scenario: scenario.to_string(),
            temp_dir,
            root,
            started: Instant::now(),
            step: 0,
        }
    }

    pub fn log_step(&mut self, description: &str) {
        self.step += 1;
        println!(
            "[E2E] {} step {}: {description} ({:?})",
            self.scenario,
            self.step,
            self.started.elapsed()
        );
    }

    pub fn themes_root(&self) -> PathBuf {
        self.root.join("themes")
    }

    pub fn run(&self, args: &[&str]) -> CommandOutput {
        let output = Command::cargo_bin("bctheme")
            .expect("binary built")
            .env("BC_ROOT", &self.root)
            .env("BC_CONFIG", self.root.join("config.toml"))
            .env_remove("RUST_LOG")
            .current_dir(self.temp_dir.path())
            .args(args)
            .output()
            .expect("Failed to run bctheme");
        let result = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        println!("[E2E] bctheme {} -> success={}", args.join(" "), result.success);
        result
    }

    pub fn init(&self) -> CommandOutput {
        self.run(&["--robot", "init"])
    }

    pub fn assert_success(&self, output: &CommandOutput, context: &str) {
        assert!(
            output.success,
            "{context} failed\nstdout:\n{}\nstderr:\n{}",
            output.stdout, output.stderr
        );
    }

    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.themes_root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn create_theme(&self, name: &str, title: &str) -> PathBuf {
        self.write_file(
            &format!("{name}/theme.toml"),
            &format!("[theme]\ntitle = \"{title}\"\nversion = \"5.0.0\"\n"),
        );
        self.write_file(
            &format!("{name}/src/Plugin.php"),
            &format!("<?php\ndeclare(strict_types=1);\n\nnamespace {name};\n\nclass Plugin\n{{\n}}\n"),
        );
        self.write_file(&format!("{name}/templates/layout/default.php"), "<html></html>\n");
        self.themes_root().join(name)
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join("bctheme.db")
    }
}
