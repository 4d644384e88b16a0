//! View-only state: which page is open, draft inputs, animations.
//!
//! Everything about the analysis session itself lives in the store; this is
//! what the window needs on top of it.

use crate::animation::TypingPlaceholder;
use shared::settings::AppSettings;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Dashboard,
    Summary,
    Similar,
    Geo,
    Trends,
    ClaimAnalysis,
}

impl Page {
    pub fn all() -> &'static [Page] {
        &[
            Page::Dashboard,
            Page::Summary,
            Page::Similar,
            Page::Geo,
            Page::Trends,
            Page::ClaimAnalysis,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Summary => "Summary",
            Page::Similar => "Similar Patents",
            Page::Geo => "Geo Insights",
            Page::Trends => "Deep Trends",
            Page::ClaimAnalysis => "Claim Analysis",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            Page::Dashboard => "View all analysis sections at a glance",
            Page::Summary => "Focus on the invention summary: problem, novelty, and solution",
            Page::Similar => "Explore similar patents, prior art, and related technologies",
            Page::Geo => "Visualize geographic hotspots for innovation in this domain",
            Page::Trends => {
                "Read an in-depth analysis of innovation trends and market opportunities"
            }
            Page::ClaimAnalysis => "Compare subject patent claims against a reference patent",
        }
    }

    /// Whether the card belonging to `section` is visible on this page.
    pub fn shows(&self, section: Page) -> bool {
        match self {
            Page::Dashboard => section != Page::ClaimAnalysis,
            page => *page == section,
        }
    }
}

pub struct UiState {
    pub settings: AppSettings,
    pub page: Page,
    pub chat_draft: String,
    /// Key typed into the setup screen before a provider exists.
    pub api_key_draft: String,
    pub setup_error: Option<String>,
    pub placeholder: TypingPlaceholder,
    pub launched_at: Instant,
}

impl UiState {
    pub fn new(settings: AppSettings) -> Self {
        let now = Instant::now();
        Self {
            settings,
            page: Page::default(),
            chat_draft: String::new(),
            api_key_draft: String::new(),
            setup_error: None,
            placeholder: TypingPlaceholder::new(now),
            launched_at: now,
        }
    }

    pub fn dark(&self) -> bool {
        self.settings.theme == shared::settings::Theme::Dark
    }

    pub fn toggle_theme(&mut self) {
        self.settings.theme = self.settings.theme.toggled();
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to persist theme: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_shows_everything_but_claims() {
        for page in Page::all() {
            assert_eq!(
                Page::Dashboard.shows(*page),
                *page != Page::ClaimAnalysis,
                "{}",
                page.label()
            );
        }
    }

    #[test]
    fn test_focused_page_shows_only_itself() {
        assert!(Page::Geo.shows(Page::Geo));
        assert!(!Page::Geo.shows(Page::Summary));
        assert!(Page::ClaimAnalysis.shows(Page::ClaimAnalysis));
        assert!(!Page::Trends.shows(Page::Dashboard));
    }
}
