//! Theme copy, delete, download staging and default-data export.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::csv_export::{ColumnPolicy, write_table_csv};
use crate::error::{BcError, Result};
use crate::storage::{FileSystem, RowStore, TableRegistry};
use crate::theme::descriptor::rewrite_namespace;
use crate::theme::scanner::ThemeScanner;
use crate::theme::{Theme, ThemeLayout, validate_name};

/// Staging subdirectory for theme downloads.
pub const THEME_STAGING_DIR: &str = "theme";
/// Staging subdirectory for default-data CSV exports.
pub const CSV_STAGING_DIR: &str = "csv";

/// Options for [`ThemePackager::default_data_patterns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    /// Label patterns as `"<title> ( <pattern> )"` instead of the bare name.
    pub use_title: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self { use_title: true }
    }
}

pub struct ThemePackager<'a> {
    fs: &'a dyn FileSystem,
    registry: &'a dyn TableRegistry,
    rows: &'a dyn RowStore,
    layout: &'a ThemeLayout,
    tmp_root: PathBuf,
    policy: ColumnPolicy,
}

impl<'a> ThemePackager<'a> {
    #[must_use]
    pub fn new(
        fs: &'a dyn FileSystem,
        registry: &'a dyn TableRegistry,
        rows: &'a dyn RowStore,
        layout: &'a ThemeLayout,
        tmp_root: impl Into<PathBuf>,
        policy: ColumnPolicy,
    ) -> Self {
        Self {
            fs,
            registry,
            rows,
            layout,
            tmp_root: tmp_root.into(),
            policy,
        }
    }

    #[must_use]
    pub const fn scanner(&self) -> ThemeScanner<'a> {
        ThemeScanner::new(self.fs, self.layout)
    }

    /// All themes under the themes root, sorted by name. A directory that
    /// cannot be read as a theme is logged and left out.
    pub fn index(&self) -> Result<Vec<Theme>> {
        let scanner = self.scanner();
        let mut themes = Vec::new();
        for name in scanner.theme_names()? {
            match scanner.theme(&name) {
                Ok(theme) => themes.push(theme),
                Err(err) => warn!(theme = %name, error = %err, "skipping unreadable theme"),
            }
        }
        debug!(count = themes.len(), "indexed themes");
        Ok(themes)
    }

    pub fn theme(&self, name: &str) -> Result<Theme> {
        self.scanner().theme(name)
    }

    /// Duplicate `name` as `<name><suffix>` and point the copy's descriptor
    /// at its new namespace.
    pub fn copy(&self, name: &str) -> Result<Theme> {
        let scanner = self.scanner();
        scanner.require(name)?;

        let new_name = self.layout.copy_name(name);
        let src = self.layout.theme_dir(name);
        let dst = self.layout.theme_dir(&new_name);
        if self.fs.exists(&dst) {
            return Err(BcError::AlreadyExists(format!("theme {new_name}")));
        }

        let files = match self
            .fs
            .copy_tree(&src, &dst)
            .and_then(|files| self.rewrite_descriptor(name, &new_name).map(|()| files))
        {
            Ok(files) => files,
            Err(err) => {
                warn!(theme = %new_name, error = %err, "copy failed, removing partial copy");
                self.remove_partial(&dst);
                return Err(err);
            }
        };

        info!(from = name, to = %new_name, files, "copied theme");
        scanner.theme(&new_name)
    }

    /// Best-effort removal of a half-written copy. The caller keeps its own
    /// error, so a cleanup failure is only logged.
    fn remove_partial(&self, dst: &Path) {
        if !self.fs.exists(dst) {
            return;
        }
        if let Err(err) = self.fs.delete_tree(dst) {
            warn!(path = %dst.display(), error = %err, "could not remove partial copy");
        }
    }

    fn rewrite_descriptor(&self, old: &str, new: &str) -> Result<()> {
        let path = self.layout.descriptor_path(new);
        if !self.fs.exists(&path) {
            warn!(theme = new, path = %path.display(), "no plugin descriptor to rewrite");
            return Ok(());
        }
        let source = self.fs.read_file(&path)?;
        let rewritten = rewrite_namespace(&source, old, new)?;
        self.fs.write_file(&path, &rewritten)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.scanner().require(name)?;
        self.fs.delete_tree(&self.layout.theme_dir(name))?;
        info!(theme = name, "deleted theme");
        Ok(())
    }

    /// Stage a copy of `name` under `<tmp>/theme/<name>` and return
    /// `<tmp>/theme`. Archiving and cleanup are up to the caller.
    pub fn create_download_to_tmp(&self, name: &str) -> Result<PathBuf> {
        self.scanner().require(name)?;

        let staging_root = self.tmp_root.join(THEME_STAGING_DIR);
        let staged = staging_root.join(name);
        self.fs.create_dir_all(&staging_root)?;
        if self.fs.exists(&staged) {
            self.fs.delete_tree(&staged)?;
        }
        let files = self.fs.copy_tree(&self.layout.theme_dir(name), &staged)?;

        info!(theme = name, files, path = %staged.display(), "staged theme for download");
        Ok(staging_root)
    }

    /// Export every registered table of every plugin to
    /// `<tmp>/csv/<Plugin>/<table>.csv` and return `<tmp>/csv`.
    pub fn create_download_default_data_pattern_to_tmp(&self) -> Result<PathBuf> {
        let csv_root = self.tmp_root.join(CSV_STAGING_DIR);
        if self.fs.exists(&csv_root) {
            self.fs.delete_tree(&csv_root)?;
        }
        self.fs.create_dir_all(&csv_root)?;

        let mut written = 0;
        for plugin in self.registry.plugins()? {
            validate_name("plugin", &plugin)?;
            written += self.write_plugin_csv(&plugin, &csv_root.join(&plugin))?.len();
        }

        info!(files = written, path = %csv_root.display(), "exported default data");
        Ok(csv_root)
    }

    /// Write one CSV per table registered for `plugin` into `dir`.
    pub fn write_plugin_csv(&self, plugin: &str, dir: &Path) -> Result<Vec<PathBuf>> {
        self.fs.create_dir_all(dir)?;
        self.registry
            .app_table_list(plugin)?
            .iter()
            .map(|table| write_table_csv(self.fs, self.rows, &self.policy, table, dir))
            .collect()
    }

    /// Default-data patterns of theme `name`, keyed `"<name>.<pattern>"`.
    pub fn default_data_patterns(
        &self,
        name: &str,
        options: PatternOptions,
    ) -> Result<BTreeMap<String, String>> {
        let scanner = self.scanner();
        scanner.require(name)?;

        let patterns = scanner.default_data_pattern_names(name)?;
        let title = if options.use_title && !patterns.is_empty() {
            Some(scanner.title(name))
        } else {
            None
        };

        Ok(patterns
            .into_iter()
            .map(|pattern| {
                let label = match &title {
                    Some(title) => format!("{title} ( {pattern} )"),
                    None => pattern.clone(),
                };
                (format!("{name}.{pattern}"), label)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, LocalFs};
    use crate::test_utils::fixtures::ThemeFixture;
    use crate::test_utils::{TestCase, run_table_tests};

    fn packager<'a>(
        fixture: &ThemeFixture,
        db: &'a Database,
        layout: &'a ThemeLayout,
    ) -> ThemePackager<'a> {
        ThemePackager::new(&LocalFs, db, db, layout, &fixture.tmp_root, fixture.policy())
    }

    #[test]
    fn copy_rewrites_namespace_and_keeps_other_bytes() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let copy = packager.copy("BcFront").unwrap();
        assert_eq!(copy.name, "BcFrontCopy");
        assert!(fixture.themes_root.join("BcFrontCopy").is_dir());

        let descriptor =
            std::fs::read_to_string(fixture.themes_root.join("BcFrontCopy/src/Plugin.php")).unwrap();
        assert!(descriptor.contains("namespace BcFrontCopy;"));

        let original = std::fs::read(fixture.themes_root.join("BcFront/templates/layout/default.php")).unwrap();
        let copied = std::fs::read(fixture.themes_root.join("BcFrontCopy/templates/layout/default.php")).unwrap();
        assert_eq!(original, copied);
    }

    #[test]
    fn second_copy_fails_with_already_exists() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        packager.copy("BcFront").unwrap();
        assert!(matches!(packager.copy("BcFront"), Err(BcError::AlreadyExists(_))));
    }

    #[test]
    fn copy_of_missing_theme_is_not_found() {
        let fixture = ThemeFixture::new();
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);
        assert!(matches!(packager.copy("Nope"), Err(BcError::NotFound(_))));
    }

    #[test]
    fn copy_without_matching_namespace_is_rolled_back() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        fixture.create_file("BcFront/src/Plugin.php", "<?php\nnamespace Other;\n");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        assert!(matches!(packager.copy("BcFront"), Err(BcError::ValidationFailed(_))));
        assert!(!fixture.themes_root.join("BcFrontCopy").exists());
    }

    #[test]
    fn delete_removes_copy() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let copy = packager.copy("BcFront").unwrap();
        packager.delete(&copy.name).unwrap();
        assert!(!fixture.themes_root.join("BcFrontCopy").exists());
        assert!(matches!(packager.delete(&copy.name), Err(BcError::NotFound(_))));
    }

    #[test]
    fn download_staging_returns_staging_root() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let staging = packager.create_download_to_tmp("BcFront").unwrap();
        assert_eq!(staging, fixture.tmp_root.join("theme"));
        assert!(staging.join("BcFront/src/Plugin.php").is_file());

        // staging again replaces the stale copy
        std::fs::write(staging.join("BcFront/stale.txt"), "x").unwrap();
        packager.create_download_to_tmp("BcFront").unwrap();
        assert!(!staging.join("BcFront/stale.txt").exists());
    }

    #[test]
    fn export_writes_one_csv_per_registered_table() {
        let fixture = ThemeFixture::new();
        let db = Database::open_in_memory().unwrap();
        db.set_site_config("email", "chuongle@mediabridge.asia").unwrap();
        db.set_site_config("google_analytics_id", "gg123").unwrap();
        db.set_site_config("version", "1.1.1").unwrap();
        db.set_site_config("name", "My Site").unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let csv_root = packager.create_download_default_data_pattern_to_tmp().unwrap();

        for plugin in db.plugins().unwrap() {
            let mut expected: Vec<String> = db
                .app_table_list(&plugin)
                .unwrap()
                .iter()
                .map(|t| format!("{t}.csv"))
                .collect();
            expected.sort();
            let mut found: Vec<String> = std::fs::read_dir(csv_root.join(&plugin))
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            found.sort();
            assert_eq!(found, expected, "plugin {plugin}");
        }

        let text = std::fs::read_to_string(csv_root.join("BaserCore/site_configs.csv")).unwrap();
        let table = crate::csv_export::csv_to_table("site_configs", &text).unwrap();
        let name_idx = table.column_index("name").unwrap();
        let value_idx = table.column_index("value").unwrap();
        for row in &table.rows {
            let key = row[name_idx].as_deref().unwrap();
            if ["email", "google_analytics_id", "version"].contains(&key) {
                assert_eq!(row[value_idx], None, "{key} should be blanked");
            } else {
                assert_eq!(row[value_idx].as_deref(), Some("My Site"));
            }
        }
        assert_eq!(table.rows.len(), 4);
    }

    #[test]
    fn export_clears_previous_staging() {
        let fixture = ThemeFixture::new();
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        std::fs::create_dir_all(fixture.tmp_root.join("csv/Old")).unwrap();
        let csv_root = packager.create_download_default_data_pattern_to_tmp().unwrap();
        assert!(!csv_root.join("Old").exists());
        assert!(csv_root.join("BcBlog/blog_posts.csv").is_file());
    }

    #[test]
    fn pattern_labels() -> std::result::Result<(), String> {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        fixture.create_pattern("BcFront", "default");
        fixture.create_pattern("BcFront", "empty");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let cases = vec![
            TestCase {
                name: "bare names",
                input: PatternOptions { use_title: false },
                expected: vec![
                    ("BcFront.default".to_string(), "default".to_string()),
                    ("BcFront.empty".to_string(), "empty".to_string()),
                ],
            },
            TestCase {
                name: "titled",
                input: PatternOptions::default(),
                expected: vec![
                    ("BcFront.default".to_string(), "フロントテーマ ( default )".to_string()),
                    ("BcFront.empty".to_string(), "フロントテーマ ( empty )".to_string()),
                ],
            },
        ];

        run_table_tests(cases, |options| {
            packager
                .default_data_patterns("BcFront", options)
                .unwrap()
                .into_iter()
                .collect::<Vec<_>>()
        })
    }

    #[test]
    fn theme_without_data_has_no_patterns() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("Plain");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        assert!(packager.default_data_patterns("Plain", PatternOptions::default()).unwrap().is_empty());
        assert!(matches!(
            packager.default_data_patterns("Nope", PatternOptions::default()),
            Err(BcError::NotFound(_))
        ));
    }

    #[test]
    fn index_is_sorted_and_stable() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcSpaSample");
        fixture.create_theme("BcFront");
        fixture.create_theme("BcColumn");
        fixture.create_dir(".git");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let first: Vec<String> = packager.index().unwrap().into_iter().map(|t| t.name).collect();
        let second: Vec<String> = packager.index().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(first, vec!["BcColumn", "BcFront", "BcSpaSample"]);
        assert_eq!(first, second);
    }

    #[test]
    fn index_skips_theme_that_cannot_be_read() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        fixture.create_dir("Broken/theme.toml");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let names: Vec<String> = packager.index().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["BcFront"]);
    }

    #[cfg(unix)]
    #[test]
    fn index_ignores_non_utf8_directory_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        std::fs::create_dir(fixture.themes_root.join(OsStr::from_bytes(b"bad\xff"))).unwrap();
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let packager = packager(&fixture, &db, &layout);

        let names: Vec<String> = packager.index().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["BcFront"]);
    }

    /// Local disk with switchable failures: `copy_tree` copies everything and
    /// then reports an error, `delete_tree` refuses to remove anything.
    struct FlakyFs {
        fail_copy: bool,
        fail_delete: bool,
    }

    impl FileSystem for FlakyFs {
        fn copy_tree(&self, src: &Path, dst: &Path) -> Result<usize> {
            let copied = LocalFs.copy_tree(src, dst)?;
            if self.fail_copy {
                return Err(BcError::Io(std::io::Error::other("disk full")));
            }
            Ok(copied)
        }

        fn delete_tree(&self, path: &Path) -> Result<()> {
            if self.fail_delete {
                return Err(BcError::Io(std::io::Error::other("device busy")));
            }
            LocalFs.delete_tree(path)
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<crate::storage::FsEntry>> {
            LocalFs.list_dir(path)
        }

        fn read_file(&self, path: &Path) -> Result<String> {
            LocalFs.read_file(path)
        }

        fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
            LocalFs.write_file(path, contents)
        }

        fn exists(&self, path: &Path) -> bool {
            LocalFs.exists(path)
        }

        fn create_dir_all(&self, path: &Path) -> Result<()> {
            LocalFs.create_dir_all(path)
        }
    }

    #[test]
    fn failed_copy_tree_leaves_no_partial_copy() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let flaky = FlakyFs {
            fail_copy: true,
            fail_delete: false,
        };
        let failing =
            ThemePackager::new(&flaky, &db, &db, &layout, &fixture.tmp_root, fixture.policy());

        let err = failing.copy("BcFront").unwrap_err();
        assert!(matches!(err, BcError::Io(_)), "{err:?}");
        assert!(!fixture.themes_root.join("BcFrontCopy").exists());

        // a retry on a healthy disk is not blocked by leftovers
        let copy = packager(&fixture, &db, &layout).copy("BcFront").unwrap();
        assert_eq!(copy.name, "BcFrontCopy");
    }

    #[test]
    fn failed_cleanup_keeps_original_error() {
        let fixture = ThemeFixture::new();
        fixture.create_theme("BcFront");
        fixture.create_file("BcFront/src/Plugin.php", "<?php\nnamespace Other;\n");
        let db = Database::open_in_memory().unwrap();
        let layout = fixture.layout();
        let flaky = FlakyFs {
            fail_copy: false,
            fail_delete: true,
        };
        let failing =
            ThemePackager::new(&flaky, &db, &db, &layout, &fixture.tmp_root, fixture.policy());

        let err = failing.copy("BcFront").unwrap_err();
        assert!(matches!(err, BcError::ValidationFailed(_)), "{err:?}");
    }
}
