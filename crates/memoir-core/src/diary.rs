//! Gated diary drafting
//!
//! Orchestrates one AI draft: reserve a quota slot through the subscription
//! facade, call the provider, and give the slot back if the provider fails.
//! Reserving before the call (rather than counting afterwards) is what keeps
//! two simultaneous requests from both squeezing past the last quota slot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::ports::ai::{AIError, AIProviderPort, DiaryPrompt};
use crate::ports::billing::BillingPort;
use crate::ports::storage::KeyValuePort;
use crate::subscription::{SubscriptionError, SubscriptionService};

/// Errors that can occur while drafting an entry
#[derive(Debug, Error)]
pub enum DiaryError {
    /// The monthly generation quota is exhausted
    #[error("Monthly generation quota exceeded ({used}/{limit})")]
    QuotaExceeded { used: u32, limit: u32 },

    /// The subscription is not active (cancelled and not re-activated)
    #[error("Subscription is not active")]
    Inactive,

    /// Subscription-side failure (storage, inactive plan bookkeeping)
    #[error("Subscription error: {0}")]
    Subscription(SubscriptionError),

    /// The AI provider failed; the reserved quota slot was released
    #[error("AI error: {0}")]
    Provider(#[from] AIError),
}

impl From<SubscriptionError> for DiaryError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::QuotaExceeded { used, limit } => {
                DiaryError::QuotaExceeded { used, limit }
            }
            other => DiaryError::Subscription(other),
        }
    }
}

/// A successfully drafted entry plus the quota it left behind
#[derive(Debug, Clone)]
pub struct DraftOutcome {
    /// Generated entry text
    pub text: String,
    /// Usage count after this draft
    pub used: u32,
    /// Monthly limit of the active plan
    pub limit: u32,
}

/// Drafts diary entries through the subscription gate
pub struct DiaryWriter<S, B, A>
where
    S: KeyValuePort + 'static,
    B: BillingPort + 'static,
    A: AIProviderPort + 'static,
{
    subscription: Arc<SubscriptionService<S, B>>,
    provider: Arc<A>,
}

impl<S, B, A> DiaryWriter<S, B, A>
where
    S: KeyValuePort + 'static,
    B: BillingPort + 'static,
    A: AIProviderPort + 'static,
{
    pub fn new(subscription: Arc<SubscriptionService<S, B>>, provider: Arc<A>) -> Self {
        Self {
            subscription,
            provider,
        }
    }

    /// Drafts one diary entry, consuming one quota slot on success
    ///
    /// # Errors
    /// * `DiaryError::Inactive` - the subscription is deactivated; the
    ///   provider is never called
    /// * `DiaryError::QuotaExceeded` - no slot available; the provider is
    ///   never called
    /// * `DiaryError::Provider` - the provider failed; the slot is released
    pub async fn draft(
        &self,
        prompt: DiaryPrompt,
        now: DateTime<Utc>,
    ) -> Result<DraftOutcome, DiaryError> {
        let status = self.subscription.current_status(now).await?;
        if !status.is_active {
            return Err(DiaryError::Inactive);
        }

        let used = self.subscription.increment_ai_usage(now).await?;
        let limit = self.subscription.active_plan().await.monthly_generation_limit;

        match self.provider.draft_entry(prompt).await {
            Ok(draft) => {
                info!(used, limit, "Diary entry drafted");
                Ok(DraftOutcome {
                    text: draft.text,
                    used,
                    limit,
                })
            }
            Err(ai_err) => {
                error!(error = %ai_err, "Draft failed, releasing quota slot");
                if let Err(release_err) = self.subscription.release_ai_usage().await {
                    // The slot stays consumed; the next monthly reset clears it
                    warn!(error = %release_err, "Failed to release quota slot");
                }
                Err(DiaryError::Provider(ai_err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::ports::ai::DiaryDraft;
    use crate::ports::billing::{PurchaseError, PurchaseResult};
    use crate::ports::storage::StorageError;
    use crate::subscription::SubscriptionService;

    struct MemoryStore {
        entries: std::sync::Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                entries: std::sync::Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl KeyValuePort for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
            self.entries.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct NoBilling;

    #[async_trait]
    impl BillingPort for NoBilling {
        async fn purchase(&self, product_id: &str) -> Result<PurchaseResult, PurchaseError> {
            Err(PurchaseError::ProductUnavailable(product_id.to_string()))
        }

        async fn restore_purchases(&self) -> Result<Vec<PurchaseResult>, PurchaseError> {
            Ok(Vec::new())
        }
    }

    struct MockProvider {
        should_fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                should_fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AIProviderPort for MockProvider {
        async fn draft_entry(&self, _prompt: DiaryPrompt) -> Result<DiaryDraft, AIError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(AIError::RequestFailed("mock outage".to_string()));
            }
            Ok(DiaryDraft {
                text: "A slow morning by the window, coffee going cold.".to_string(),
            })
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn test_prompt() -> DiaryPrompt {
        DiaryPrompt {
            system_message: "diarist".to_string(),
            user_text: "today".to_string(),
            photos: vec![],
        }
    }

    async fn writer(
        now: DateTime<Utc>,
    ) -> (
        Arc<MockProvider>,
        Arc<SubscriptionService<MemoryStore, NoBilling>>,
        DiaryWriter<MemoryStore, NoBilling, MockProvider>,
    ) {
        let subscription = Arc::new(
            SubscriptionService::initialize(Arc::new(MemoryStore::new()), Arc::new(NoBilling), now)
                .await
                .unwrap(),
        );
        let provider = Arc::new(MockProvider::new());
        let writer = DiaryWriter::new(Arc::clone(&subscription), Arc::clone(&provider));
        (provider, subscription, writer)
    }

    #[tokio::test]
    async fn test_draft_consumes_quota() {
        let now = at(2024, 6, 1);
        let (provider, subscription, writer) = writer(now).await;

        let outcome = writer.draft(test_prompt(), now).await.unwrap();
        assert!(!outcome.text.is_empty());
        assert_eq!(outcome.used, 1);
        assert_eq!(outcome.limit, 10);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            subscription.current_status(now).await.unwrap().usage_count,
            1
        );
    }

    #[tokio::test]
    async fn test_exhausted_quota_never_calls_provider() {
        let now = at(2024, 6, 1);
        let (provider, subscription, writer) = writer(now).await;
        for _ in 0..10 {
            subscription.increment_ai_usage(now).await.unwrap();
        }

        let err = writer.draft(test_prompt(), now).await.unwrap_err();
        assert!(matches!(err, DiaryError::QuotaExceeded { used: 10, limit: 10 }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_subscription_blocks_drafting() {
        let now = at(2024, 6, 1);
        let (provider, subscription, writer) = writer(now).await;
        subscription.cancel_subscription().await.unwrap();

        let err = writer.draft(test_prompt(), now).await.unwrap_err();
        assert!(matches!(err, DiaryError::Inactive));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_releases_slot() {
        let now = at(2024, 6, 1);
        let (provider, subscription, writer) = writer(now).await;
        provider.should_fail.store(true, Ordering::SeqCst);

        let err = writer.draft(test_prompt(), now).await.unwrap_err();
        assert!(matches!(err, DiaryError::Provider(_)));

        // The reserved slot was given back
        assert_eq!(
            subscription.current_status(now).await.unwrap().usage_count,
            0
        );
    }
}
