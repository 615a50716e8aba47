use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use crate::types::{RequestContext, RequestType, SessionKey, SynthesizedResponse};

const SUMMARY_MAX_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub request_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub request_type: RequestType,
    pub request_summary: String,
    pub response_summary: String,
    pub confidence: f64,
    pub fallback: bool,
}

impl HistoryEntry {
    pub fn new(context: &RequestContext, response: &SynthesizedResponse) -> Self {
        Self {
            request_id: response.metadata.request_id,
            recorded_at: Utc::now(),
            request_type: context.request_type,
            request_summary: summarize(&context.request.text),
            response_summary: summarize(&response.content),
            confidence: response.confidence,
            fallback: response.metadata.fallback,
        }
    }
}

fn summarize(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_string();
    }
    let mut summary: String = text.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    summary.push_str("...");
    summary
}

#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    cap: usize,
    items: VecDeque<T>,
}

impl<T> BoundedLog<T> {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            items: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.cap {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Per-session bounded history. Appends to one session serialize on that
/// session's lock only.
pub struct SessionHistory {
    cap: usize,
    sessions: RwLock<HashMap<SessionKey, Arc<Mutex<BoundedLog<HistoryEntry>>>>>,
}

impl SessionHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn append(&self, session_key: &str, entry: HistoryEntry) {
        let log = self.session(session_key);
        let mut log = log.lock().unwrap_or_else(|e| e.into_inner());
        log.push(entry);
    }

    pub fn entries(&self, session_key: &str) -> Vec<HistoryEntry> {
        let log = {
            let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
            match sessions.get(session_key) {
                Some(log) => log.clone(),
                None => return Vec::new(),
            }
        };
        let log = log.lock().unwrap_or_else(|e| e.into_inner());
        log.iter().cloned().collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn session(&self, session_key: &str) -> Arc<Mutex<BoundedLog<HistoryEntry>>> {
        if let Some(log) = self
            .sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_key)
        {
            return log.clone();
        }

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(session_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(BoundedLog::new(self.cap))))
            .clone()
    }
}
