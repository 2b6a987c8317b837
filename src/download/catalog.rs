use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use crate::platform::{ArchitectureTag, OperatingSystem};

const RELEASE_DOWNLOAD_BASE: &str = "https://github.com/LSXPrime/ProseFlow/releases/latest/download";

/// Page listing every published release.
pub const RELEASE_NOTES_URL: &str = "https://github.com/LSXPrime/ProseFlow/releases";

/// Kind of downloadable file. Ordered by preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Installer,
    Portable,
}

/// A single downloadable file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadArtifact {
    pub label: String,
    pub extension: String,
    pub url: String,
}

impl DownloadArtifact {
    pub fn new(label: &str, extension: &str, url: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            extension: extension.to_string(),
            url: url.into(),
        }
    }

    fn release_file(label: &str, extension: &str, file: &str) -> Self {
        Self::new(label, extension, format!("{}/{}", RELEASE_DOWNLOAD_BASE, file))
    }
}

/// One CPU-architecture-specific build for an operating system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchitectureVariant {
    pub name: String,
    pub arch: ArchitectureTag,
    pub downloads: BTreeMap<ArtifactKind, DownloadArtifact>,
}

impl ArchitectureVariant {
    pub fn new(name: &str, arch: ArchitectureTag) -> Self {
        Self {
            name: name.to_string(),
            arch,
            downloads: BTreeMap::new(),
        }
    }

    /// Add a download, replacing any existing one of the same kind.
    pub fn with(mut self, kind: ArtifactKind, artifact: DownloadArtifact) -> Self {
        self.downloads.insert(kind, artifact);
        self
    }

    /// The installer if there is one, otherwise the portable package.
    pub fn preferred_artifact(&self) -> Option<&DownloadArtifact> {
        self.downloads.values().next()
    }
}

/// Downloads offered for one operating system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatingSystemEntry {
    pub os: OperatingSystem,
    pub icon: String,
    pub architectures: Vec<ArchitectureVariant>,
}

/// Every download the site offers, keyed by operating system.
///
/// Holds exactly one entry per [`OperatingSystem`], stored in tab order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DownloadCatalog {
    entries: Vec<OperatingSystemEntry>,
}

static BUILTIN: LazyLock<DownloadCatalog> = LazyLock::new(|| DownloadCatalog {
    entries: builtin_entries(),
});

impl DownloadCatalog {
    /// Build a catalog after checking its invariants.
    pub fn new(entries: Vec<OperatingSystemEntry>) -> Result<Self> {
        Self::validate(&entries)?;

        let mut entries = entries;
        entries.sort_by_key(|e| tab_index(e.os));
        Ok(Self { entries })
    }

    /// The catalog compiled into the site.
    pub fn builtin() -> &'static DownloadCatalog {
        &BUILTIN
    }

    /// Entries in tab order.
    pub fn entries(&self) -> &[OperatingSystemEntry] {
        &self.entries
    }

    /// The entry for `os`; a validated catalog has exactly one.
    pub fn entry(&self, os: OperatingSystem) -> &OperatingSystemEntry {
        &self.entries[tab_index(os)]
    }

    /// Check that the entries cover each OS once, that every OS has at least
    /// one variant with unique architecture tags, and that every variant has
    /// at least one artifact.
    pub fn validate(entries: &[OperatingSystemEntry]) -> Result<()> {
        for os in OperatingSystem::ALL {
            let count = entries.iter().filter(|e| e.os == os).count();
            if count != 1 {
                bail!("Catalog must contain exactly one {} entry, found {}", os, count);
            }
        }

        for entry in entries {
            if entry.architectures.is_empty() {
                bail!("{} has no architecture variants", entry.os);
            }

            let mut seen = HashSet::new();
            for variant in &entry.architectures {
                if !seen.insert(variant.arch) {
                    bail!("{} lists architecture {} more than once", entry.os, variant.arch);
                }
                if variant.downloads.is_empty() {
                    bail!("{} variant '{}' has no downloads", entry.os, variant.name);
                }
            }
        }

        Ok(())
    }
}

fn tab_index(os: OperatingSystem) -> usize {
    match os {
        OperatingSystem::Windows => 0,
        OperatingSystem::MacOs => 1,
        OperatingSystem::Linux => 2,
    }
}

fn builtin_entries() -> Vec<OperatingSystemEntry> {
    use ArtifactKind::{Installer, Portable};

    vec![
        OperatingSystemEntry {
            os: OperatingSystem::Windows,
            icon: "ion:logo-windows".to_string(),
            architectures: vec![
                ArchitectureVariant::new("Windows (64-bit)", ArchitectureTag::X64)
                    .with(
                        Installer,
                        DownloadArtifact::release_file("Installer", ".exe", "ProseFlow-win-x64-Setup.exe"),
                    )
                    .with(
                        Portable,
                        DownloadArtifact::release_file("Portable", ".zip", "ProseFlow-win-x64-Portable.zip"),
                    ),
            ],
        },
        OperatingSystemEntry {
            os: OperatingSystem::MacOs,
            icon: "wpf:mac-os".to_string(),
            architectures: vec![
                ArchitectureVariant::new("Apple Silicon", ArchitectureTag::Arm64)
                    .with(
                        Installer,
                        DownloadArtifact::release_file("Installer", ".pkg", "ProseFlow-osx-arm64-Setup.pkg"),
                    )
                    .with(
                        Portable,
                        DownloadArtifact::release_file("Portable", ".zip", "ProseFlow-osx-arm64-Portable.zip"),
                    ),
                ArchitectureVariant::new("Intel", ArchitectureTag::X64)
                    .with(
                        Installer,
                        DownloadArtifact::release_file("Installer", ".pkg", "ProseFlow-osx-x64-Setup.pkg"),
                    )
                    .with(
                        Portable,
                        DownloadArtifact::release_file("Portable", ".zip", "ProseFlow-osx-x64-Portable.zip"),
                    ),
            ],
        },
        OperatingSystemEntry {
            os: OperatingSystem::Linux,
            icon: "fa:linux".to_string(),
            architectures: vec![
                ArchitectureVariant::new("Standard (x64)", ArchitectureTag::X64).with(
                    Installer,
                    DownloadArtifact::release_file("AppImage", ".AppImage", "ProseFlow-linux-x64.AppImage"),
                ),
                ArchitectureVariant::new("ARM (arm64)", ArchitectureTag::Arm64).with(
                    Installer,
                    DownloadArtifact::release_file("AppImage", ".AppImage", "ProseFlow-linux-arm64.AppImage"),
                ),
            ],
        },
    ]
}
