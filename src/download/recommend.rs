use log::debug;
use serde::Serialize;

use super::catalog::{ArchitectureVariant, DownloadCatalog};
use crate::platform::{ArchitectureTag, ClientEnvironment, GraphicsProbe, OperatingSystem, Platform};

/// Text and target of the main download button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub text: String,
    pub url: String,
}

/// Outcome of platform detection against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub os: OperatingSystem,
    /// Architecture the recommendation was made for. When the requested tag
    /// is not a known architecture this is the fallback variant's tag.
    pub arch: ArchitectureTag,
    pub variant: ArchitectureVariant,
    pub recommendation: Recommendation,
}

impl DetectionResult {
    /// Detect the client platform and pick its recommended download.
    pub fn detect(
        env: &ClientEnvironment,
        probe: &dyn GraphicsProbe,
        catalog: &DownloadCatalog,
    ) -> Self {
        let platform = Platform::detect(env, probe);
        build_recommendation(platform.os, platform.arch.as_str(), catalog)
    }
}

/// Pick the variant matching `arch` for `os`, falling back to the first
/// variant listed for that OS. Never fails.
///
/// `arch` is free-form so that tags outside [`ArchitectureTag`] simply miss.
pub fn build_recommendation(
    os: OperatingSystem,
    arch: &str,
    catalog: &DownloadCatalog,
) -> DetectionResult {
    let entry = catalog.entry(os);

    let variant = match entry.architectures.iter().find(|v| v.arch.as_str() == arch) {
        Some(variant) => variant,
        None => {
            debug!(
                "No {} build for architecture {:?}, falling back to '{}'",
                os, arch, entry.architectures[0].name
            );
            &entry.architectures[0]
        }
    };

    let url = variant
        .preferred_artifact()
        .map(|a| a.url.clone())
        .unwrap_or_else(|| "#".to_string());

    DetectionResult {
        os,
        arch: arch.parse().unwrap_or(variant.arch),
        variant: variant.clone(),
        recommendation: Recommendation {
            text: format!("Download for {} ({})", os, variant.name),
            url,
        },
    }
}
