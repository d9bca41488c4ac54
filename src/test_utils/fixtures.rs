use std::path::PathBuf;

use tempfile::TempDir;

use crate::csv_export::ColumnPolicy;
use crate::config::ExportConfig;
use crate::theme::ThemeLayout;

/// Isolated install root with a themes directory, a staging directory and
/// helpers to build theme trees in it.
pub struct ThemeFixture {
    pub temp_dir: TempDir,
    pub themes_root: PathBuf,
    pub tmp_root: PathBuf,
}

impl Default for ThemeFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let themes_root = temp_dir.path().join("themes");
        let tmp_root = temp_dir.path().join("tmp");
        std::fs::create_dir_all(&themes_root).expect("Failed to create themes root");

        println!("[FIXTURE] Created temp directory: {:?}", temp_dir.path());

        Self {
            temp_dir,
            themes_root,
            tmp_root,
        }
    }

    #[must_use]
    pub fn layout(&self) -> ThemeLayout {
        ThemeLayout::with_defaults(&self.themes_root)
    }

    #[must_use]
    pub fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::from_config(&ExportConfig::default())
    }

    /// Create a file under the themes root.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.themes_root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Create a directory under the themes root.
    pub fn create_dir(&self, relative_path: &str) -> PathBuf {
        let full_path = self.themes_root.join(relative_path);
        std::fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Create a theme with a manifest, a plugin descriptor and a template.
    pub fn create_theme(&self, name: &str) -> PathBuf {
        let title = if name == "BcFront" { "フロントテーマ" } else { name };
        self.create_theme_with_title(name, title)
    }

    pub fn create_theme_with_title(&self, name: &str, title: &str) -> PathBuf {
        self.create_file(
            &format!("{name}/theme.toml"),
            &format!("[theme]\ntitle = \"{title}\"\nversion = \"5.0.0\"\nauthor = \"baserCMS Users Community\"\n"),
        );
        self.create_file(
            &format!("{name}/src/Plugin.php"),
            &format!(
                "<?php\ndeclare(strict_types=1);\n\nnamespace {name};\n\nuse BaserCore\\BcPlugin;\n\nclass Plugin extends BcPlugin\n{{\n}}\n"
            ),
        );
        self.create_file(
            &format!("{name}/templates/layout/default.php"),
            "<html><body><?= $this->fetch('content') ?></body></html>\n",
        );
        println!("[FIXTURE] Created theme: {name}");
        self.themes_root.join(name)
    }

    /// Create an empty default-data pattern for `theme`.
    pub fn create_pattern(&self, theme: &str, pattern: &str) -> PathBuf {
        self.create_dir(&format!("{theme}/config/data/{pattern}/BaserCore"))
    }

    /// Write a CSV file into a pattern.
    pub fn create_pattern_csv(
        &self,
        theme: &str,
        pattern: &str,
        plugin: &str,
        table: &str,
        content: &str,
    ) -> PathBuf {
        self.create_file(
            &format!("{theme}/config/data/{pattern}/{plugin}/{table}.csv"),
            content,
        )
    }
}

impl Drop for ThemeFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.temp_dir.path());
    }
}
