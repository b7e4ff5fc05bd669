use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Links discovered on one page, split by how they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub url: String,
    /// Absolute links pointing at the scanned host.
    pub pages: BTreeSet<String>,
    /// Root-relative links resolved against the scanned origin.
    pub hidden: BTreeSet<String>,
}

impl ScanResult {
    pub fn new(url: String) -> Self {
        Self {
            url,
            pages: BTreeSet::new(),
            hidden: BTreeSet::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.pages.len() + self.hidden.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSource {
    /// Output of the external header tool.
    Tool,
    /// HEAD request issued directly because the tool was missing.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDump {
    pub source: HeaderSource,
    pub text: String,
}

/// Outcome of one verb in a request sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbOutcome {
    pub method: String,
    pub result: Result<u16, ErrorKind>,
}

impl VerbOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}
