//! Setup phase: the one-shot device directory fetch

use crate::error::{SetupError, SetupResult};
use hp_client::{paths, HubApi};
use hp_core::DeviceDirectory;
use tracing::{info, warn};

/// Longest body excerpt kept in error messages
const BODY_EXCERPT: usize = 200;

/// Read-only state shared by every check of a run
///
/// Built once by [`RunContext::fetch`] before any check starts and only
/// borrowed afterwards.
#[derive(Debug, Clone)]
pub struct RunContext {
    directory: DeviceDirectory,
}

impl RunContext {
    /// Fetch `GET /devices/` exactly once and freeze the result
    pub async fn fetch(api: &dyn HubApi) -> SetupResult<Self> {
        let path = paths::devices();
        let endpoint = format!("GET {}", api.url(&path));

        let response = api
            .get(&path)
            .await
            .map_err(|source| SetupError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if response.status.as_u16() != 200 {
            warn!("Directory fetch returned HTTP {}", response.status);
            return Err(SetupError::UnexpectedStatus {
                endpoint,
                status: response.status.as_u16(),
                body: excerpt(&response.raw_body),
            });
        }

        let Some(body) = response.body else {
            return Err(SetupError::NotJson {
                endpoint,
                body: excerpt(&response.raw_body),
            });
        };

        let directory = DeviceDirectory::from_json(&body)
            .map_err(|source| SetupError::InvalidDirectory { endpoint, source })?;

        info!("Device directory has {} devices", directory.len());
        Ok(Self::from_directory(directory))
    }

    /// Wrap an already known directory
    pub fn from_directory(directory: DeviceDirectory) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }
}

pub(crate) fn excerpt(raw: &str) -> String {
    if raw.chars().count() <= BODY_EXCERPT {
        raw.to_string()
    } else {
        let cut: String = raw.chars().take(BODY_EXCERPT).collect();
        format!("{}...", cut)
    }
}
