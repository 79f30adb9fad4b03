//! In-memory transport and clock for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde_json::Value;

use crate::clock::Clock;
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Clock whose sleeps return immediately and move virtual time forward
#[derive(Debug, Default)]
pub(crate) struct FakeClock {
    now: AtomicI64,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub(crate) fn starting_at(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut secs = duration.as_secs() as i64;
        if duration.subsec_nanos() > 0 {
            secs += 1;
        }
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

/// Transport that replays a fixed script of outcomes and records every
/// request together with the virtual time it was sent at
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    sent: Mutex<Vec<(i64, ApiRequest)>>,
    clock: Arc<FakeClock>,
}

impl ScriptedTransport {
    pub(crate) fn new(clock: Arc<FakeClock>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            clock,
        })
    }

    pub(crate) fn respond(&self, response: ApiResponse) -> &Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub(crate) fn fail(&self, error: TransportError) -> &Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub(crate) fn sent(&self) -> Vec<(i64, ApiRequest)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_urls(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, r)| r.url).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((self.clock.now(), request.clone()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {}", request.url))
    }
}

/// Build a response with a JSON body
pub(crate) fn response(status: u16, headers: &[(&str, &str)], body: Value) -> ApiResponse {
    let body = if body.is_null() {
        String::new()
    } else {
        body.to_string()
    };
    ApiResponse::new(
        StatusCode::from_u16(status).unwrap(),
        header_map(headers),
        body,
    )
}

pub(crate) fn header_map(headers: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    map
}
