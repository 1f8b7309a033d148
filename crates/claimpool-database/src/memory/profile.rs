//! In-memory holder profiles.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use claimpool_core::result::AppResult;
use claimpool_core::traits::AttributionSource;
use claimpool_core::types::HolderId;

use crate::store::HolderProfileStore;

/// Holder display names kept in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryHolderProfiles {
    names: Arc<DashMap<HolderId, String>>,
}

impl MemoryHolderProfiles {
    /// Create an empty profile map.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttributionSource for MemoryHolderProfiles {
    async fn snapshot(&self, holder: &HolderId) -> AppResult<Option<String>> {
        Ok(self.names.get(holder).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl HolderProfileStore for MemoryHolderProfiles {
    async fn set_display_name(
        &self,
        holder: &HolderId,
        display_name: Option<&str>,
        _now: DateTime<Utc>,
    ) -> AppResult<()> {
        match display_name {
            Some(name) => {
                self.names.insert(holder.clone(), name.to_string());
            }
            None => {
                self.names.remove(holder);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_clear_display_name() {
        let profiles = MemoryHolderProfiles::new();
        let holder = HolderId::parse("stake1abc").unwrap();
        assert_eq!(profiles.snapshot(&holder).await.unwrap(), None);

        profiles
            .set_display_name(&holder, Some("Acme"), Utc::now())
            .await
            .unwrap();
        assert_eq!(profiles.snapshot(&holder).await.unwrap().as_deref(), Some("Acme"));

        profiles.set_display_name(&holder, None, Utc::now()).await.unwrap();
        assert_eq!(profiles.snapshot(&holder).await.unwrap(), None);
    }
}
