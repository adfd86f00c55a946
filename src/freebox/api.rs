//! API Version Negotiation
//!
//! Resolves the integer version used in request paths and builds URLs of the
//! form `https://{api_domain}:{https_port}{api_base_url}v{N}/{path}`.

use crate::error::{ExporterError, Result};
use crate::freebox::types::ApiVersion;

/// Compute the query version from the advertised API version
///
/// `override_version == 0` keeps the advertised major; a non-zero override
/// must not exceed it.
pub fn query_version(api: &ApiVersion, override_version: u32) -> Result<u32> {
    let raw = api.api_version.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);

    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != 2 {
        return Err(ExporterError::Version(format!(
            "could not decode the api version \"{}\"",
            api.api_version
        )));
    }
    let major: u32 = parts[0].parse().map_err(|_| {
        ExporterError::Version(format!(
            "could not decode the api version \"{}\"",
            api.api_version
        ))
    })?;

    if override_version > major {
        return Err(ExporterError::Version(format!(
            "the api version {} is higher than the current one {}",
            override_version, major
        )));
    }

    let version = if override_version > 0 {
        override_version
    } else {
        major
    };
    if version == 0 {
        return Err(ExporterError::Version(format!(
            "the api version \"{}\" resolves to 0",
            api.api_version
        )));
    }
    Ok(version)
}

/// Negotiated endpoint of one Freebox
#[derive(Debug, Clone)]
pub struct FreeboxApi {
    pub info: ApiVersion,
    pub version: u32,
}

impl FreeboxApi {
    pub fn negotiate(info: ApiVersion, override_version: u32) -> Result<Self> {
        if !info.is_valid() {
            return Err(ExporterError::Version(format!(
                "incomplete api description for \"{}\"",
                info.api_domain
            )));
        }
        let version = query_version(&info, override_version)?;
        Ok(Self { info, version })
    }

    /// Absolute URL of `path` (no leading slash, e.g. `"system/"`)
    pub fn url(&self, path: &str) -> String {
        format!(
            "https://{}:{}{}v{}/{}",
            self.info.api_domain,
            self.info.https_port,
            self.info.api_base_url,
            self.version,
            path
        )
    }
}
