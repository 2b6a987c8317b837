//! Client platform detection.
//!
//! This module turns the platform and user-agent strings reported by a
//! browser-like host into a best-guess operating system and CPU
//! architecture. Detection is heuristic and never fails: anything that
//! cannot be classified falls back to Windows / x64.

mod detection;
mod probe;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use detection::{ARCH_RULES, ArchRule, Platform, resolve_architecture, resolve_operating_system};
pub use probe::{FixedRendererProbe, GraphicsProbe, NoGraphicsProbe, is_apple_silicon};

#[cfg(test)]
pub use probe::MockGraphicsProbe;

/// CPU architecture of a downloadable build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchitectureTag {
    #[serde(rename = "x64")]
    X64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl ArchitectureTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchitectureTag::X64 => "x64",
            ArchitectureTag::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for ArchitectureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchitectureTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x64" => Ok(ArchitectureTag::X64),
            "arm64" => Ok(ArchitectureTag::Arm64),
            other => Err(anyhow!(
                "Unknown architecture '{}'. Expected 'x64' or 'arm64'.",
                other
            )),
        }
    }
}

/// Operating systems the site offers downloads for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingSystem {
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
}

impl OperatingSystem {
    /// Every supported OS, in download tab order.
    pub const ALL: [OperatingSystem; 3] = [
        OperatingSystem::Windows,
        OperatingSystem::MacOs,
        OperatingSystem::Linux,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Windows => "Windows",
            OperatingSystem::MacOs => "macOS",
            OperatingSystem::Linux => "Linux",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatingSystem::ALL
            .into_iter()
            .find(|os| os.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown operating system '{}'. Expected Windows, macOS or Linux.",
                    s
                )
            })
    }
}

/// Strings reported by the host environment.
///
/// Neither field has a guaranteed format; both may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientEnvironment {
    pub platform: String,
    pub user_agent: String,
}

impl ClientEnvironment {
    pub fn new(platform: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            user_agent: user_agent.into(),
        }
    }
}
