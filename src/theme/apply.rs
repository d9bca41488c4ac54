//! Switch a site to another theme.

use tracing::info;

use crate::error::Result;
use crate::storage::{Site, SiteStore};
use crate::theme::scanner::ThemeScanner;

pub struct ThemeApplier<'a> {
    scanner: ThemeScanner<'a>,
    sites: &'a dyn SiteStore,
}

impl<'a> ThemeApplier<'a> {
    #[must_use]
    pub const fn new(scanner: ThemeScanner<'a>, sites: &'a dyn SiteStore) -> Self {
        Self { scanner, sites }
    }

    /// Point `site` at `theme` and return the default-data notice for the
    /// new theme (empty when it ships no default data).
    ///
    /// `site` is only updated after the store has committed; on error it is
    /// left as it was.
    pub fn apply(&self, site: &mut Site, theme: &str) -> Result<Vec<String>> {
        self.scanner.require(theme)?;
        let messages = self.scanner.default_data_info(theme, Vec::new())?;

        let mut updated = site.clone();
        updated.theme = theme.to_string();
        let saved = self.sites.save_site(&updated)?;

        info!(site = saved.id, from = %site.theme, to = %saved.theme, "applied theme");
        *site = saved;

        Ok(messages)
    }
}
