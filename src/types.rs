// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hardware the miner should use
///
/// Transmitted and persisted as an integer: `1` for CPU, `2` for GPU. Any other
/// value is kept verbatim so a configuration written by a newer front-end
/// round-trips; such profiles mine against the pool's generic endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum HardwareProfile {
    /// CPU mining
    #[default]
    Cpu,
    /// GPU mining
    Gpu,
    /// Unrecognised profile code
    Other(u8),
}

impl HardwareProfile {
    /// Wire code of the profile
    pub fn code(self) -> u8 {
        match self {
            HardwareProfile::Cpu => 1,
            HardwareProfile::Gpu => 2,
            HardwareProfile::Other(code) => code,
        }
    }
}

impl From<u8> for HardwareProfile {
    fn from(code: u8) -> Self {
        match code {
            1 => HardwareProfile::Cpu,
            2 => HardwareProfile::Gpu,
            other => HardwareProfile::Other(other),
        }
    }
}

impl From<HardwareProfile> for u8 {
    fn from(profile: HardwareProfile) -> Self {
        profile.code()
    }
}

impl fmt::Display for HardwareProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareProfile::Cpu => write!(f, "cpu"),
            HardwareProfile::Gpu => write!(f, "gpu"),
            HardwareProfile::Other(code) => write!(f, "profile-{}", code),
        }
    }
}

/// Miner executables the control plane knows how to drive
///
/// Each kind maps to one driver in [`crate::miner`]. The kind is detected from
/// the executable bundled in the installation's `miner` directory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// XMRig, configured through `config.json`
    #[serde(rename = "xmrig")]
    Xmrig,

    /// xmr-stak, configured through `config.txt`, `pools.txt` and `cpu.txt`
    #[serde(rename = "xmr-stak")]
    XmrStak,
}

impl BackendKind {
    /// File stem of the executable for this kind
    pub fn executable_stem(self) -> &'static str {
        match self {
            BackendKind::Xmrig => "xmrig",
            BackendKind::XmrStak => "xmr-stak",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable_stem())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xmrig" => Ok(BackendKind::Xmrig),
            "xmr-stak" | "xmrstak" => Ok(BackendKind::XmrStak),
            _ => Err(format!("Unknown miner backend: {}", s)),
        }
    }
}
