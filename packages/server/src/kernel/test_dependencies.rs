// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into the summary service and the
// neighbor index builder for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseAI, BaseNeighborStore};
use crate::common::ParcelId;
use crate::domains::parcels::models::UpsertOutcome;

// =============================================================================
// Mock AI
// =============================================================================

/// Scripted reply for one `complete` call
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

/// Arguments captured from a completion call
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Clone)]
pub struct MockAI {
    model: String,
    responses: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
    delay: Option<Duration>,
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Queue a successful response
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockReply::Text(response.into()));
        self
    }

    /// Queue a failed call
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockReply::Error(message.into()));
        self
    }

    /// Sleep before answering (drives timeout paths)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|c| c.prompt.clone())
    }
}

#[async_trait]
impl BaseAI for MockAI {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.calls.lock().unwrap().push(CompletionCall {
            prompt: prompt.to_string(),
            max_tokens,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("MockAI has no queued response")),
        }
    }
}

// =============================================================================
// In-memory Neighbor Store
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemoryNeighborStore {
    sets: Arc<Mutex<HashMap<ParcelId, Vec<ParcelId>>>>,
    failing: Arc<Mutex<HashSet<ParcelId>>>,
}

impl InMemoryNeighborStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upsert for `parcel_id` fail
    pub fn fail_on(self, parcel_id: ParcelId) -> Self {
        self.failing.lock().unwrap().insert(parcel_id);
        self
    }

    pub fn get(&self, parcel_id: ParcelId) -> Option<Vec<ParcelId>> {
        self.sets.lock().unwrap().get(&parcel_id).cloned()
    }

    pub fn snapshot(&self) -> HashMap<ParcelId, Vec<ParcelId>> {
        self.sets.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.sets.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseNeighborStore for InMemoryNeighborStore {
    async fn upsert(
        &self,
        parcel_id: ParcelId,
        neighbor_ids: &[ParcelId],
    ) -> Result<UpsertOutcome> {
        if self.failing.lock().unwrap().contains(&parcel_id) {
            anyhow::bail!("simulated write failure for parcel {}", parcel_id);
        }

        let previous = self
            .sets
            .lock()
            .unwrap()
            .insert(parcel_id, neighbor_ids.to_vec());

        Ok(match previous {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        })
    }
}
