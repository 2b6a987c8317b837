use super::catalog::{ArchitectureVariant, DownloadCatalog, OperatingSystemEntry};
use super::recommend::{DetectionResult, Recommendation};
use crate::platform::OperatingSystem;

/// Version label shown until the latest release is known.
pub const FALLBACK_VERSION: &str = "latest";

const DEFAULT_BUTTON_TEXT: &str = "Download ProseFlow";

/// State of one download section: selected tab, recommended download and
/// displayed version.
#[derive(Debug, Clone)]
pub struct DownloadPanel<'c> {
    catalog: &'c DownloadCatalog,
    selected: OperatingSystem,
    recommendation: Option<Recommendation>,
    version: String,
}

impl<'c> DownloadPanel<'c> {
    /// Windows tab selected, no recommendation yet, placeholder version.
    pub fn new(catalog: &'c DownloadCatalog) -> Self {
        Self {
            catalog,
            selected: OperatingSystem::Windows,
            recommendation: None,
            version: FALLBACK_VERSION.to_string(),
        }
    }

    /// Switch to the detected OS tab and remember the recommendation.
    pub fn apply_detection(&mut self, detection: &DetectionResult) {
        self.selected = detection.os;
        self.recommendation = Some(detection.recommendation.clone());
    }

    /// Switch tabs. The recommendation is left alone.
    pub fn select_os(&mut self, os: OperatingSystem) {
        self.selected = os;
    }

    /// Replace the displayed version, e.g. once the release lookup answers.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// The OS whose tab is open.
    pub fn selected_os(&self) -> OperatingSystem {
        self.selected
    }

    /// One tab per catalog entry, in display order.
    pub fn tabs(&self) -> impl Iterator<Item = &OperatingSystemEntry> {
        self.catalog.entries().iter()
    }

    /// Architecture variants listed under the open tab.
    pub fn visible_variants(&self) -> &[ArchitectureVariant] {
        &self.catalog.entry(self.selected).architectures
    }

    /// Label of the main download button.
    pub fn button_text(&self) -> &str {
        self.recommendation
            .as_ref()
            .map_or(DEFAULT_BUTTON_TEXT, |r| r.text.as_str())
    }

    /// Target of the main download button; `#` until a detection is applied.
    pub fn button_link(&self) -> &str {
        self.recommendation.as_ref().map_or("#", |r| r.url.as_str())
    }

    /// Footer line under the button.
    pub fn version_line(&self) -> String {
        format!("Free & Open Source | Version {}", self.version)
    }
}
