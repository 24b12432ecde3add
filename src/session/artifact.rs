//! Generated audio artifacts and their resource lifetime.
//!
//! An artifact is one synthesis result held in memory. The playback
//! session owns at most one live artifact at a time; every transition
//! that replaces or discards one releases it synchronously first. The
//! [`LiveGauge`] makes that invariant observable in tests.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed filename used for downloads and the proxy's attachment hint.
pub const OUTPUT_FILENAME: &str = "output.wav";

/// Counts artifacts whose backing bytes have not been released.
///
/// Owned by the session that creates artifacts; cloning shares the
/// underlying counter.
#[derive(Debug, Clone, Default)]
pub struct LiveGauge(Arc<AtomicUsize>);

impl LiveGauge {
    /// Create a gauge starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unreleased) artifacts tracked by this gauge.
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// One generated audio result and its in-memory resource.
pub struct AudioArtifact {
    bytes: Bytes,
    content_type: String,
    created_at: DateTime<Utc>,
    gauge: LiveGauge,
    released: bool,
}

impl AudioArtifact {
    /// Take ownership of synthesized bytes, registering with the gauge.
    pub fn new(bytes: Bytes, content_type: impl Into<String>, gauge: &LiveGauge) -> Self {
        gauge.0.fetch_add(1, Ordering::SeqCst);
        Self {
            bytes,
            content_type: content_type.into(),
            created_at: Utc::now(),
            gauge: gauge.clone(),
            released: false,
        }
    }

    /// The raw audio payload.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Content type reported for the payload.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// When the artifact was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Release the backing resource. Idempotent; also runs on drop.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.bytes = Bytes::new();
            self.gauge.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Whether the backing resource has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for AudioArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioArtifact")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("created_at", &self.created_at)
            .field("released", &self.released)
            .finish()
    }
}
