use std::path::PathBuf;

use crate::edgar::client::USER_AGENT;

#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub user_agent: String,
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(
            std::env::var("TRACKER_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        );
        let user_agent =
            std::env::var("TRACKER_USER_AGENT").unwrap_or_else(|_| USER_AGENT.to_string());

        Self {
            data_dir,
            user_agent,
        }
    }
}
