//! Attribution lookup used to freeze a holder's display name at sale time.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::HolderId;

/// External, mutable source of a holder's display attribute.
///
/// The completion engine copies the value it returns into the sold unit.
/// Later changes at the source never touch that copy.
#[async_trait]
pub trait AttributionSource: Send + Sync + std::fmt::Debug + 'static {
    /// Current display attribute for the holder, if one is known.
    async fn snapshot(&self, holder: &HolderId) -> AppResult<Option<String>>;
}

/// Attribution source that knows nothing about anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAttribution;

#[async_trait]
impl AttributionSource for NoAttribution {
    async fn snapshot(&self, _holder: &HolderId) -> AppResult<Option<String>> {
        Ok(None)
    }
}
