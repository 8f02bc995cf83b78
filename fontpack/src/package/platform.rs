//! Supported target platforms.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// A target platform packages can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    X86_64Linux,
    Aarch64Linux,
    X86_64Darwin,
    Aarch64Darwin,
}

impl Platform {
    /// All supported platforms, in a stable order.
    pub const ALL: [Platform; 4] = [
        Platform::X86_64Linux,
        Platform::Aarch64Linux,
        Platform::X86_64Darwin,
        Platform::Aarch64Darwin,
    ];

    /// Canonical `<arch>-<os>` identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64Linux => "x86_64-linux",
            Self::Aarch64Linux => "aarch64-linux",
            Self::X86_64Darwin => "x86_64-darwin",
            Self::Aarch64Darwin => "aarch64-darwin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("unknown platform '{}'", s.trim()))
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Set of platforms a package is offered on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlatformSet {
    /// Unrestricted.
    #[default]
    All,

    /// Only the listed platforms.
    Only(BTreeSet<Platform>),
}

impl PlatformSet {
    /// Restrict to the given platforms.
    pub fn only(platforms: impl IntoIterator<Item = Platform>) -> Self {
        Self::Only(platforms.into_iter().collect())
    }

    /// Check whether `platform` is in the set.
    pub fn supports(&self, platform: Platform) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(&platform),
        }
    }

    /// The concrete platforms in the set.
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.supports(*p))
            .collect()
    }
}

impl fmt::Display for PlatformSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(set) => {
                let names: Vec<&str> = set.iter().map(|p| p.as_str()).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

impl FromStr for PlatformSet {
    type Err = String;

    /// Parse `all` or a comma-separated platform list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let set = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<BTreeSet<Platform>, _>>()?;
        if set.is_empty() {
            return Err("platform list is empty".to_string());
        }
        Ok(Self::Only(set))
    }
}

impl Serialize for PlatformSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.platforms())
    }
}
