// Scan configuration

use serde::{Deserialize, Serialize};

/// What to do with the stored checksum of each page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Leave verification to the caller
    #[default]
    Ignore,
    /// Log mismatches and keep going
    Warn,
    /// Stop the scan with an error on the first mismatch
    Reject,
}

/// Options for [`crate::ogg::PageReader`] and [`crate::ogg::PageIndex`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Leave page payloads unread
    pub skip_payload: bool,
    pub checksum_policy: ChecksumPolicy,
    /// Pages between progress messages, 0 disables them
    pub progress_interval: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            skip_payload: false,
            checksum_policy: ChecksumPolicy::Ignore,
            progress_interval: 1000,
        }
    }
}

impl ScanConfig {
    pub fn skip_payload(mut self, skip: bool) -> Self {
        self.skip_payload = skip;
        self
    }

    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }
}
