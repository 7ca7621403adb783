//! Build log interpreter
//!
//! The deployment pipeline captures the raw console output of the external
//! build tool; the three extraction rules below mirror that tool's literal
//! output format and must not be loosened. A log that matches neither the
//! name/version rule nor the version-only rule, or that lacks a completion
//! timestamp, fails the deployment hard rather than recording a partial
//! result.

use std::sync::LazyLock;

use regex::Regex;

use crate::deploy::model::Deployment;
use crate::errors::AdminError;

/// Primary rule: artifact upload line carrying name, version and outcome.
static NAME_VERSION_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(.*)-([0-9]+\.[0-9]+)-jar-with-dependencies.jar\} to environment: (.*) (.*)")
        .expect("invalid name/version rule")
});

/// Fallback rule: build header line; yields the version only.
static VERSION_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Building (.*) ([0-9]+\.[0-9]+)").expect("invalid version rule"));

/// Completion timestamp line; mandatory in every accepted log.
static TIMESTAMP_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Finished at: (.*)").expect("invalid timestamp rule"));

/// Derive the structured deployment facts from the captured build log.
///
/// On the fallback path only `version` is populated; `name` stays unset and
/// `success` stays false, matching the external tool's historical output
/// contract.
pub fn resolve(dep: &mut Deployment) -> Result<(), AdminError> {
    let logs = dep.logs.clone();

    if let Some(caps) = NAME_VERSION_RULE.captures(&logs) {
        dep.name = Some(caps[1].to_string());
        dep.version = Some(caps[2].to_string());
        dep.success = caps[4].starts_with("success");
    } else if let Some(caps) = VERSION_RULE.captures(&logs) {
        dep.version = Some(caps[2].to_string());
    } else {
        return Err(AdminError::Parse(
            "build output matches neither the artifact nor the build-header pattern".to_string(),
        ));
    }

    let caps = TIMESTAMP_RULE.captures(&logs).ok_or_else(|| {
        AdminError::Parse("build output carries no 'Finished at:' timestamp".to_string())
    })?;
    dep.timestamp = Some(caps[1].to_string());

    Ok(())
}
