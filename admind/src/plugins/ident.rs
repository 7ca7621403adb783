//! Plugin identifier codec
//!
//! Registry records are keyed by a single combined string of the form
//! `<name>-<id>-<version>`. Decoding is right-anchored: the last `-`
//! separated field is the version, the one before it is the numeric id and
//! everything to the left is the name, so names may themselves contain `-`.
//! The id and version channels round-trip exactly; the name channel is
//! preserved under this convention but carries no uniqueness guarantee.

use crate::errors::AdminError;

/// Identity of one plugin record, derived from its combined key.
///
/// `(id, version)` uniquely identifies a plugin record.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginIdentifier {
    pub id: i32,
    pub name: String,
    pub version: f64,
}

impl PluginIdentifier {
    /// The version rendered back as key text.
    pub fn version_text(&self) -> String {
        format_version(self.version)
    }
}

/// Render a version number the way the combined key carries it: integral
/// values keep one decimal place (`1.0`, not `1`).
pub fn format_version(version: f64) -> String {
    if version.is_finite() && version.fract() == 0.0 {
        format!("{:.1}", version)
    } else {
        version.to_string()
    }
}

/// Encode a combined plugin key.
pub fn encode(id: i32, name: &str, version: f64) -> String {
    format!("{}-{}-{}", name, id, format_version(version))
}

/// Decode a combined plugin key.
pub fn decode(key: &str) -> Result<PluginIdentifier, AdminError> {
    let mut fields = key.rsplitn(3, '-');
    let version_text = fields.next().unwrap_or_default();
    let id_text = fields
        .next()
        .ok_or_else(|| AdminError::MalformedRequest(format!("Invalid plugin key: {}", key)))?;
    let name = fields
        .next()
        .ok_or_else(|| AdminError::MalformedRequest(format!("Invalid plugin key: {}", key)))?;

    let id: i32 = id_text
        .parse()
        .map_err(|_| AdminError::MalformedRequest(format!("Invalid plugin id in key: {}", key)))?;
    let version: f64 = version_text
        .parse()
        .map_err(|_| AdminError::MalformedRequest(format!("Invalid plugin version in key: {}", key)))?;

    Ok(PluginIdentifier {
        id,
        name: name.to_string(),
        version,
    })
}
