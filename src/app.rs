use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::OutputFormat;
use crate::config::{Config, ResolvedPaths};
use crate::csv_export::ColumnPolicy;
use crate::error::{BcError, Result};
use crate::storage::{Database, GlobalLock, LocalFs};
use crate::theme::{DefaultDataLoader, ThemeApplier, ThemeLayout, ThemePackager, ThemeScanner};
use crate::utils::ensure_dir;

/// Name of the per-project root directory searched for upwards from cwd.
pub const PROJECT_DIR: &str = ".bctheme";

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub paths: ResolvedPaths,
    pub layout: ThemeLayout,
    pub db: Database,
    pub fs: LocalFs,
    pub output_format: OutputFormat,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = find_root()?;
        ensure_dir(&root)?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let paths = config.resolve_paths(&root);
        ensure_dir(&paths.themes_root)?;
        let layout = ThemeLayout::new(&paths.themes_root, &config.layout);

        let output_format = match cli.output_format() {
            OutputFormat::Human => OutputFormat::from_config(&config.robot.format),
            format => format,
        };

        Ok(Self {
            db: Database::open(&paths.database)?,
            root,
            config,
            paths,
            layout,
            fs: LocalFs,
            output_format,
        })
    }

    #[must_use]
    pub fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::from_config(&self.config.export)
    }

    #[must_use]
    pub const fn scanner(&self) -> ThemeScanner<'_> {
        ThemeScanner::new(&self.fs, &self.layout)
    }

    #[must_use]
    pub fn packager(&self) -> ThemePackager<'_> {
        ThemePackager::new(
            &self.fs,
            &self.db,
            &self.db,
            &self.layout,
            self.paths.tmp_root.clone(),
            self.policy(),
        )
    }

    #[must_use]
    pub const fn applier(&self) -> ThemeApplier<'_> {
        ThemeApplier::new(self.scanner(), &self.db)
    }

    #[must_use]
    pub fn loader(&self) -> DefaultDataLoader<'_> {
        DefaultDataLoader::new(&self.fs, &self.db, &self.db, &self.layout, self.policy())
    }

    /// Take the install-wide lock for a mutating command.
    pub fn lock(&self) -> Result<GlobalLock> {
        GlobalLock::acquire_timeout(&self.root, Duration::from_millis(self.config.lock.timeout_ms))
    }
}

/// `BC_ROOT`, else the nearest `.bctheme` above cwd, else the user data dir.
pub fn find_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var("BC_ROOT") {
        return Ok(PathBuf::from(root));
    }
    let cwd = std::env::current_dir()?;
    if let Some(found) = find_upwards(&cwd, PROJECT_DIR) {
        return Ok(found);
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| BcError::MissingConfig("data directory not found".to_string()))?;
    Ok(data_dir.join("bctheme"))
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
