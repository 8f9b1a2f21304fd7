//! Per-open configuration, the Rust analogue of the host library's
//! property-list values (`persistence`, `page_size`).

use crate::error::{EngineError, EngineResult};

/// Configuration supplied at `open`, equivalent to the property-list
/// values a host library would store via the driver registration facade.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Whether a backing file is maintained.
    pub persistence: bool,
    /// Page/blob size `P` in bytes.
    pub page_size: usize,
}

impl EngineConfig {
    /// Validates and constructs a config. `page_size` must be positive.
    pub fn new(persistence: bool, page_size: usize) -> EngineResult<Self> {
        if page_size == 0 {
            return Err(EngineError::InvalidArgument(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            persistence,
            page_size,
        })
    }
}

impl Default for EngineConfig {
    /// 4 KiB pages, non-persistent — a reasonable default for standalone use.
    fn default() -> Self {
        Self {
            persistence: false,
            page_size: 4096,
        }
    }
}
