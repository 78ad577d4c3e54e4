//! Display engine configuration.

use notescope_core::{defaults, Error, Result};

/// Configuration for the display engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Notes per page of search results.
    pub notes_per_page: usize,
    /// Id and name of the placeholder identity shown before the first lookup.
    pub personal_sentinel: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            notes_per_page: defaults::NOTES_PER_PAGE,
            personal_sentinel: defaults::PERSONAL_WORKSPACE_SENTINEL.to_string(),
        }
    }
}

impl DisplayConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `NOTESCOPE_NOTES_PER_PAGE` | `10` | Notes per page (minimum 1) |
    /// | `NOTESCOPE_PERSONAL_SENTINEL` | `personal` | Placeholder workspace id/name |
    pub fn from_env() -> Self {
        let notes_per_page = std::env::var(defaults::ENV_NOTES_PER_PAGE)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults::NOTES_PER_PAGE)
            .max(1);

        let personal_sentinel = std::env::var(defaults::ENV_PERSONAL_SENTINEL)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults::PERSONAL_WORKSPACE_SENTINEL.to_string());

        Self {
            notes_per_page,
            personal_sentinel,
        }
    }

    /// Set notes per page.
    pub fn with_notes_per_page(mut self, notes_per_page: usize) -> Self {
        self.notes_per_page = notes_per_page;
        self
    }

    /// Set the placeholder workspace id/name.
    pub fn with_personal_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.personal_sentinel = sentinel.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.notes_per_page == 0 {
            return Err(Error::Config(
                "notes_per_page must be at least 1".to_string(),
            ));
        }
        if self.personal_sentinel.trim().is_empty() {
            return Err(Error::Config(
                "personal_sentinel must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
