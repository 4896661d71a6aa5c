// src/crawl/pacer.rs
// =============================================================================
// Polite crawling: a fixed minimum gap between the start of two requests.
//
// The first request goes out immediately. Every later request waits until
// `spacing` has passed since the previous one started. The last-request time
// sits behind a tokio Mutex, so one Pacer shared through an Arc spaces out
// requests from several tasks as well.
//
// This is a constant delay, not a backoff: a slow or failing server does not
// change the spacing.
// =============================================================================

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug)]
pub struct Pacer {
    spacing: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_request: Mutex::new(None),
        }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    // Waits for this request's turn
    //
    // Returns: how long we actually slept
    pub async fn wait(&self) -> Duration {
        let mut last = self.last_request.lock().await;

        let waited = match *last {
            Some(previous) if !self.spacing.is_zero() => {
                let ready_at = previous + self.spacing;
                let now = Instant::now();
                if ready_at > now {
                    trace!(wait_ms = (ready_at - now).as_millis() as u64, "pacing request");
                    tokio::time::sleep_until(ready_at).await;
                    ready_at - now
                } else {
                    Duration::ZERO
                }
            }
            _ => Duration::ZERO,
        };

        *last = Some(Instant::now());
        waited
    }
}
