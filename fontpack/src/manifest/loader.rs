//! INI manifest loading.
//!
//! # Format
//!
//! ```ini
//! [fontpack]
//! default = default
//!
//! [package.custom-fast-fonts]
//! version = 1.0.0
//! source = fonts
//! extension = ttf
//! destination = share/fonts/truetype
//! description = Fast Font variants for speed reading
//! platforms = all
//!
//! [composite.default]
//! version = 1.0.0
//! members = custom-fast-fonts, original-fast-fonts
//! ```
//!
//! Relative `source` paths are resolved against the manifest's directory.

use std::path::Path;

use ini::{Ini, Properties};
use semver::Version;
use tracing::{debug, warn};

use super::{Manifest, ManifestError, PackageDecl, DEFAULT_PACKAGE};
use crate::package::{
    CompositePackage, DestinationRule, PackageMetadata, PackageSpec, PlatformSet, Selector,
};

/// Conventional manifest file name.
pub const MANIFEST_FILE_NAME: &str = "fontpack.ini";

const SETTINGS_SECTION: &str = "fontpack";
const PACKAGE_PREFIX: &str = "package.";
const COMPOSITE_PREFIX: &str = "composite.";

const LEAF_KEYS: &[&str] = &[
    "version",
    "source",
    "extension",
    "pattern",
    "destination",
    "description",
    "homepage",
    "license",
    "platforms",
];
const COMPOSITE_KEYS: &[&str] = &[
    "version",
    "members",
    "description",
    "homepage",
    "license",
    "platforms",
];

impl Manifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let ini = Ini::load_from_file(path).map_err(|e| ManifestError::Load {
            path: path.to_path_buf(),
            source: e,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        debug!(path = %path.display(), "Loaded manifest file");
        Self::from_ini(&ini, base_dir)
    }

    /// Parse and validate manifest text.
    ///
    /// Relative source directories are resolved against `base_dir`.
    pub fn from_ini_str(text: &str, base_dir: &Path) -> Result<Self, ManifestError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini, base_dir)
    }

    fn from_ini(ini: &Ini, base_dir: &Path) -> Result<Self, ManifestError> {
        let default_package = ini
            .section(Some(SETTINGS_SECTION))
            .and_then(|s| s.get("default"))
            .unwrap_or(DEFAULT_PACKAGE);

        let mut manifest = Manifest::new(default_package.trim());

        for (section, props) in ini.iter() {
            let Some(section) = section else {
                if props.iter().next().is_some() {
                    warn!("Ignoring keys outside of any manifest section");
                }
                continue;
            };

            if section == SETTINGS_SECTION {
                continue;
            }

            let decl = if let Some(name) = section.strip_prefix(PACKAGE_PREFIX) {
                warn_unknown_keys(section, props, LEAF_KEYS);
                PackageDecl::Leaf(parse_leaf(section, name, props)?.rooted_at(base_dir))
            } else if let Some(name) = section.strip_prefix(COMPOSITE_PREFIX) {
                warn_unknown_keys(section, props, COMPOSITE_KEYS);
                PackageDecl::Composite(parse_composite(section, name, props)?)
            } else {
                return Err(ManifestError::UnknownSection(section.to_string()));
            };

            manifest.insert(decl)?;
        }

        manifest.validate()?;
        Ok(manifest)
    }
}

fn parse_leaf(section: &str, name: &str, props: &Properties) -> Result<PackageSpec, ManifestError> {
    let name = require_name(section, name)?;
    let version = parse_version(section, name, props)?;
    let source = require(section, props, "source")?;

    let selector = match (props.get("extension"), props.get("pattern")) {
        (Some(_), Some(_)) => {
            return Err(ManifestError::InvalidSelector {
                package: name.to_string(),
                reason: "'extension' and 'pattern' are mutually exclusive".to_string(),
            })
        }
        (Some(ext), None) => Selector::extension(ext.trim()),
        (None, Some(pattern)) => {
            Selector::pattern(pattern.trim()).map_err(|e| ManifestError::InvalidSelector {
                package: name.to_string(),
                reason: e.to_string(),
            })?
        }
        (None, None) => Selector::truetype(),
    };

    let destination = match props.get("destination") {
        Some(dir) => DestinationRule::flatten(dir.trim()),
        None => DestinationRule::truetype(),
    };
    if !destination.is_contained() {
        let DestinationRule::Flatten { dir } = destination;
        return Err(ManifestError::UnsafeDestination {
            package: name.to_string(),
            dir,
        });
    }

    Ok(PackageSpec::fonts(name, version, source)
        .with_selector(selector)
        .with_destination(destination)
        .with_metadata(parse_metadata(name, props)?))
}

fn parse_composite(
    section: &str,
    name: &str,
    props: &Properties,
) -> Result<CompositePackage, ManifestError> {
    let name = require_name(section, name)?;
    let version = parse_version(section, name, props)?;
    let members = require(section, props, "members")?;

    let composite = members
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .fold(CompositePackage::new(name, version), |c, m| c.with_member(m));

    Ok(composite.with_metadata(parse_metadata(name, props)?))
}

fn parse_metadata(name: &str, props: &Properties) -> Result<PackageMetadata, ManifestError> {
    let platforms = match props.get("platforms") {
        Some(list) => list
            .parse::<PlatformSet>()
            .map_err(|reason| ManifestError::InvalidPlatforms {
                package: name.to_string(),
                reason,
            })?,
        None => PlatformSet::All,
    };

    Ok(PackageMetadata {
        description: props.get("description").map(|s| s.trim().to_string()),
        homepage: props.get("homepage").map(|s| s.trim().to_string()),
        license: props.get("license").map(|s| s.trim().to_string()),
        platforms,
    })
}

fn parse_version(section: &str, name: &str, props: &Properties) -> Result<Version, ManifestError> {
    let value = require(section, props, "version")?;
    Version::parse(value).map_err(|e| ManifestError::InvalidVersion {
        package: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn require<'a>(section: &str, props: &'a Properties, key: &str) -> Result<&'a str, ManifestError> {
    props
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ManifestError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn require_name<'a>(section: &str, name: &'a str) -> Result<&'a str, ManifestError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ManifestError::MissingKey {
            section: section.to_string(),
            key: "name".to_string(),
        });
    }
    Ok(name)
}

fn warn_unknown_keys(section: &str, props: &Properties, known: &[&str]) {
    for (key, _) in props.iter() {
        if !known.contains(&key) {
            warn!(section, key, "Ignoring unknown manifest key");
        }
    }
}
