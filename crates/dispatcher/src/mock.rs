//! ScriptedTransport - in-memory transport for tests and demos
//!
//! Replies are taken from a script in order; once the script is exhausted
//! every attempt gets the fallback reply.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use contracts::DispatchError;

use crate::transport::{Transport, TransportResponse};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Producer answers with this status
    Status(u16),
    /// Attempt fails before any response
    Error(DispatchError),
}

/// Scripted transport
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<ScriptedReply>>,
    fallback: ScriptedReply,
    /// Simulated round-trip time
    latency: Duration,
    attempts: AtomicU32,
    attempt_times: Mutex<Vec<Instant>>,
    bodies: Mutex<Vec<Bytes>>,
    closed: AtomicBool,
}

impl ScriptedTransport {
    /// Every attempt answered with `status`
    pub fn always(status: u16) -> Self {
        Self::sequence(Vec::new(), ScriptedReply::Status(status))
    }

    /// Every attempt fails with `error`
    pub fn failing(error: DispatchError) -> Self {
        Self::sequence(Vec::new(), ScriptedReply::Error(error))
    }

    /// `replies` in order, then `fallback` forever
    pub fn sequence(replies: Vec<ScriptedReply>, fallback: ScriptedReply) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            fallback,
            latency: Duration::ZERO,
            attempts: AtomicU32::new(0),
            attempt_times: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Start time of each attempt
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempt_times
            .lock()
            .map(|times| times.clone())
            .unwrap_or_default()
    }

    /// Payloads received, in order
    pub fn bodies(&self) -> Vec<Bytes> {
        self.bodies
            .lock()
            .map(|bodies| bodies.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> ScriptedReply {
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Transport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        "scripted://producer/publish"
    }

    async fn send(&self, body: Bytes) -> Result<TransportResponse, DispatchError> {
        if self.is_closed() {
            return Err(DispatchError::transport("transport closed"));
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut times) = self.attempt_times.lock() {
            times.push(Instant::now());
        }
        if let Ok(mut bodies) = self.bodies.lock() {
            bodies.push(body);
        }
        let reply = self.next_reply();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match reply {
            ScriptedReply::Status(status) => Ok(TransportResponse::new(status, "")),
            ScriptedReply::Error(e) => Err(e),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
