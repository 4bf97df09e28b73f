//! Mock link and transport for testing and development.
//!
//! [`MockLink`] comes up after a chosen number of status polls (or never).
//! [`MockTransport`] replays scripted replies and records every request it
//! was asked to make; clones share the same script and log, so a test can
//! keep one clone while the client owns another.

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use facegate_core::Credentials;

use crate::error::{ConnectivityError, TransportError};
use crate::link::{LinkStatus, NetworkLink};
use crate::transport::{HttpResponse, HttpTransport};

#[derive(Debug, Default)]
struct LinkCounters {
    polls: AtomicU32,
    begins: AtomicU32,
    disconnects: AtomicU32,
    dropped: AtomicBool,
}

/// Mock network link.
///
/// # Examples
///
/// ```
/// use facegate_core::Credentials;
/// use facegate_network::link::{LinkStatus, NetworkLink};
/// use facegate_network::mock::MockLink;
///
/// #[tokio::main]
/// async fn main() {
///     let mut link = MockLink::up_after(1);
///     link.begin(&Credentials::new("ssid", "pass")).await.unwrap();
///
///     assert_eq!(link.status().await, LinkStatus::Down);
///     assert_eq!(link.status().await, LinkStatus::Up);
/// }
/// ```
#[derive(Debug)]
pub struct MockLink {
    up_after: Option<u32>,
    reject: Option<String>,
    addr: IpAddr,
    counters: Arc<LinkCounters>,
}

impl MockLink {
    /// Link that reports `Down` for the first `polls` status checks, then `Up`.
    pub fn up_after(polls: u32) -> Self {
        Self {
            up_after: Some(polls),
            reject: None,
            addr: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)),
            counters: Arc::default(),
        }
    }

    /// Link that never comes up.
    pub fn never_up() -> Self {
        Self {
            up_after: None,
            ..Self::up_after(0)
        }
    }

    /// Link whose `begin` fails with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            reject: Some(reason.into()),
            ..Self::never_up()
        }
    }

    /// Address reported once connected.
    pub fn with_addr(mut self, addr: IpAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Handle for observing and disturbing the link.
    pub fn handle(&self) -> MockLinkHandle {
        MockLinkHandle {
            counters: Arc::clone(&self.counters),
        }
    }
}

impl NetworkLink for MockLink {
    async fn begin(&mut self, _credentials: &Credentials) -> Result<(), ConnectivityError> {
        self.counters.begins.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.reject {
            return Err(ConnectivityError::Link(reason.clone()));
        }
        self.counters.dropped.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn status(&mut self) -> LinkStatus {
        let polls = self.counters.polls.fetch_add(1, Ordering::SeqCst);
        if self.counters.dropped.load(Ordering::SeqCst) {
            return LinkStatus::Down;
        }
        match self.up_after {
            Some(n) if polls >= n => LinkStatus::Up,
            _ => LinkStatus::Down,
        }
    }

    async fn local_addr(&mut self) -> Option<IpAddr> {
        Some(self.addr)
    }

    async fn disconnect(&mut self) {
        self.counters.disconnects.fetch_add(1, Ordering::SeqCst);
        self.counters.dropped.store(true, Ordering::SeqCst);
    }
}

/// Handle onto a [`MockLink`].
#[derive(Debug, Clone)]
pub struct MockLinkHandle {
    counters: Arc<LinkCounters>,
}

impl MockLinkHandle {
    /// Make the link report `Down` until the next `begin`.
    pub fn drop_link(&self) {
        self.counters.dropped.store(true, Ordering::SeqCst);
    }

    pub fn status_polls(&self) -> u32 {
        self.counters.polls.load(Ordering::SeqCst)
    }

    pub fn begins(&self) -> u32 {
        self.counters.begins.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> u32 {
        self.counters.disconnects.load(Ordering::SeqCst)
    }
}

/// Scripted transport outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Complete response.
    Respond(HttpResponse),

    /// Failure below HTTP.
    Fail(TransportError),

    /// Never complete.
    Stall,
}

impl MockReply {
    /// 200 with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Respond(HttpResponse::ok(body))
    }

    /// `status` with `body`.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Respond(HttpResponse::new(status, body))
    }
}

/// Request seen by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

#[derive(Debug)]
struct TransportScript {
    replies: VecDeque<MockReply>,
    fallback: MockReply,
    requests: Vec<RecordedRequest>,
}

/// Mock HTTP transport.
///
/// # Examples
///
/// ```
/// use facegate_network::mock::{MockReply, MockTransport};
/// use facegate_network::transport::HttpTransport;
///
/// #[tokio::main]
/// async fn main() {
///     let transport = MockTransport::new();
///     transport.push(MockReply::ok(r#"{"success": true}"#));
///
///     let response = transport.post_json("http://svc/recognize", "{}".into()).await.unwrap();
///     assert_eq!(response.status, 200);
///     assert_eq!(transport.calls(), 1);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    script: Arc<Mutex<TransportScript>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Transport with an empty script. Unscripted calls fail to connect.
    pub fn new() -> Self {
        Self::always(MockReply::Fail(TransportError::Connect(
            "no scripted reply".to_string(),
        )))
    }

    /// Transport that answers every call with `reply`.
    pub fn always(reply: MockReply) -> Self {
        Self {
            script: Arc::new(Mutex::new(TransportScript {
                replies: VecDeque::new(),
                fallback: reply,
                requests: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TransportScript> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a reply ahead of the fallback.
    pub fn push(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    /// Number of requests made so far.
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    /// Requests made so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    async fn exchange(&self, request: RecordedRequest) -> Result<HttpResponse, TransportError> {
        let reply = {
            let mut script = self.lock();
            script.requests.push(request);
            match script.replies.pop_front() {
                Some(reply) => reply,
                None => script.fallback.clone(),
            }
        };
        match reply {
            MockReply::Respond(response) => Ok(response),
            MockReply::Fail(error) => Err(error),
            MockReply::Stall => std::future::pending().await,
        }
    }
}

impl HttpTransport for MockTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        self.exchange(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            body: Some(body),
        })
        .await
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.exchange(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            body: None,
        })
        .await
    }
}
