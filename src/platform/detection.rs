use log::debug;

use super::probe::{GraphicsProbe, is_apple_silicon};
use super::{ArchitectureTag, ClientEnvironment, OperatingSystem};

/// A single architecture detection rule.
///
/// The rules are string heuristics and are only approximately right: browsers
/// freeze or spoof both the platform and the user-agent strings. They are
/// evaluated top to bottom and the first match wins, which matters because a
/// user agent can carry markers of more than one architecture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArchRule {
    /// User agent contains any of the markers.
    UserAgentContains(&'static [&'static str], ArchitectureTag),
    /// Platform string starts with any of the prefixes.
    PlatformStartsWith(&'static [&'static str], ArchitectureTag),
    /// Platform string equals the value exactly; the graphics probe decides
    /// between Apple Silicon (arm64) and Intel (x64).
    PlatformEqualsThenProbe(&'static str),
}

/// Ordered architecture rules. Anything left unmatched is x64.
pub const ARCH_RULES: &[ArchRule] = &[
    ArchRule::UserAgentContains(
        &["x86_64", "x86-64", "Win64", "x64", "amd64", "WOW64"],
        ArchitectureTag::X64,
    ),
    ArchRule::UserAgentContains(&["ARM64", "AArch64"], ArchitectureTag::Arm64),
    ArchRule::PlatformStartsWith(&["Linux x86_64"], ArchitectureTag::X64),
    ArchRule::PlatformStartsWith(&["Linux aarch64", "Linux armv8l"], ArchitectureTag::Arm64),
    ArchRule::PlatformEqualsThenProbe("MacIntel"),
];

impl ArchRule {
    /// Returns the architecture if this rule matches.
    ///
    /// The probe is only consulted by a matching `PlatformEqualsThenProbe` rule.
    pub fn apply(
        &self,
        user_agent: &str,
        platform: &str,
        probe: &dyn GraphicsProbe,
    ) -> Option<ArchitectureTag> {
        match *self {
            ArchRule::UserAgentContains(markers, arch) => markers
                .iter()
                .any(|m| user_agent.contains(m))
                .then_some(arch),
            ArchRule::PlatformStartsWith(prefixes, arch) => prefixes
                .iter()
                .any(|p| platform.starts_with(p))
                .then_some(arch),
            ArchRule::PlatformEqualsThenProbe(expected) => {
                if platform != expected {
                    return None;
                }
                if is_apple_silicon(probe) {
                    Some(ArchitectureTag::Arm64)
                } else {
                    Some(ArchitectureTag::X64)
                }
            }
        }
    }
}

/// Best guess of the client's CPU architecture.
pub fn resolve_architecture(
    user_agent: &str,
    platform: &str,
    probe: &dyn GraphicsProbe,
) -> ArchitectureTag {
    for (index, rule) in ARCH_RULES.iter().enumerate() {
        if let Some(arch) = rule.apply(user_agent, platform, probe) {
            debug!("Architecture rule #{} matched: {}", index, arch);
            return arch;
        }
    }

    debug!("No architecture rule matched, defaulting to x64");
    ArchitectureTag::X64
}

/// Best guess of the client's operating system. Total: unknown input is Windows.
pub fn resolve_operating_system(platform: &str) -> OperatingSystem {
    if platform.contains("Win") {
        OperatingSystem::Windows
    } else if platform.contains("Mac") {
        OperatingSystem::MacOs
    } else if platform.contains("Linux") {
        OperatingSystem::Linux
    } else {
        OperatingSystem::Windows
    }
}

/// Detected operating system and architecture of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: OperatingSystem,
    pub arch: ArchitectureTag,
}

impl Platform {
    /// Detect the client platform from the strings its host reported.
    pub fn detect(env: &ClientEnvironment, probe: &dyn GraphicsProbe) -> Self {
        let os = resolve_operating_system(&env.platform);
        let arch = resolve_architecture(&env.user_agent, &env.platform, probe);
        debug!(
            "Detected {} / {} from platform {:?}",
            os, arch, env.platform
        );
        Self { os, arch }
    }
}
