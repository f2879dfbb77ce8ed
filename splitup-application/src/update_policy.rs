use crate::{error::UpdateCheckError, ports::UpdateChecker};
use serde::Deserialize;

pub const DEFAULT_STORE_URL: &str =
    "https://play.google.com/store/apps/details?id=com.techtool.splitup";
pub const DEFAULT_UPDATE_MESSAGE: &str =
    "A new version is available! Update now for the best experience.";

/// Version gate published by the remote config service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteVersionConfig {
    pub force_update: bool,
    pub latest_version: u32,
    pub min_version: u32,
    #[serde(rename = "playstore_url")]
    pub store_url: String,
    pub update_message: String,
}

impl Default for RemoteVersionConfig {
    fn default() -> Self {
        Self {
            force_update: false,
            latest_version: 0,
            min_version: 0,
            store_url: DEFAULT_STORE_URL.to_owned(),
            update_message: DEFAULT_UPDATE_MESSAGE.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateInfo {
    /// The running build may not be used until updated.
    pub force: bool,
    pub store_url: String,
    pub message: String,
}

impl UpdateInfo {
    pub fn title(&self) -> &'static str {
        if self.force {
            "Update Required"
        } else {
            "Update Available"
        }
    }
}

pub struct UpdatePolicy;

impl UpdatePolicy {
    /// Builds below `min_version` must update. Builds below `latest_version`
    /// are offered an update, forced only when the remote asks for it.
    pub fn evaluate(current_version: u32, remote: &RemoteVersionConfig) -> Option<UpdateInfo> {
        let below_min = current_version < remote.min_version;
        let below_latest = current_version < remote.latest_version;
        if !below_min && !below_latest {
            return None;
        }

        Some(UpdateInfo {
            force: below_min || (below_latest && remote.force_update),
            store_url: remote.store_url.clone(),
            message: remote.update_message.clone(),
        })
    }

    pub fn check(
        checker: &dyn UpdateChecker,
        current_version: u32,
    ) -> Result<Option<UpdateInfo>, UpdateCheckError> {
        let remote = checker.fetch_remote()?;
        let info = Self::evaluate(current_version, &remote);
        tracing::debug!(
            current_version,
            latest_version = remote.latest_version,
            min_version = remote.min_version,
            update = info.is_some(),
            "Evaluated app version"
        );
        Ok(info)
    }
}
