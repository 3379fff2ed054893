//! Test doubles for the fetcher and notifier seams.
//!
//! Both record every call behind `Arc<Mutex<_>>` so tests can assert on
//! what the pipeline actually requested or posted.

use crate::error::{FetchError, NotifyError};
use crate::fetcher::{Fetch, FetchResponse};
use crate::notify::Notify;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves canned responses by exact URL. Unknown URLs fail like a refused
/// connection.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchResponse>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_requested(&self, needle: &str) -> bool {
        self.requests().iter().any(|u| u.contains(needle))
    }
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Connect(format!("no route to {url}")))
    }
}

/// Notifier that answers from a queue of results (accepting everything once
/// the queue is empty) and keeps every payload it was given.
#[derive(Clone, Default)]
pub struct MockNotifier {
    results: Arc<Mutex<Vec<Result<(), NotifyError>>>>,
    posted: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MockNotifier {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self::with_results(vec![
            Err(NotifyError::Rejected {
                status: 400,
                body: "invalid_blocks".to_string(),
            }),
            Err(NotifyError::Rejected {
                status: 400,
                body: "invalid_payload".to_string(),
            }),
        ])
    }

    pub fn with_results(results: Vec<Result<(), NotifyError>>) -> Self {
        Self {
            results: Arc::new(Mutex::new(results)),
            posted: Arc::default(),
        }
    }

    pub fn posted(&self) -> Vec<serde_json::Value> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notify for MockNotifier {
    async fn post(&self, payload: &serde_json::Value) -> Result<(), NotifyError> {
        self.posted.lock().unwrap().push(payload.clone());
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(())
        } else {
            results.remove(0)
        }
    }
}
