//! In-flight deduplication and per-run result caching for conversions.
//!
//! [`Converter`] wraps a [`HeicCodec`] behind a slot table keyed by source
//! path. The first request for a path runs the codec; concurrent requests for
//! the same path block until that run finishes, then share its result.
//! Finished results — successes and failures alike — stay cached for the
//! lifetime of the service, so a failed source is never retried within a run.

use super::codec::{HeicCodec, JpegQuality};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};

/// Outcome of one source conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Complete JPEG file contents.
    Ready(Vec<u8>),
    /// Human-readable failure reason, as recorded in the catalog.
    Failed(String),
}

impl Conversion {
    pub fn is_ready(&self) -> bool {
        matches!(self, Conversion::Ready(_))
    }
}

/// Per-source state in the slot table.
enum Slot {
    InFlight,
    Finished(Conversion),
}

pub struct Converter<'a, C: HeicCodec + ?Sized> {
    codec: &'a C,
    quality: JpegQuality,
    slots: Mutex<HashMap<PathBuf, Slot>>,
    finished: Condvar,
}

impl<'a, C: HeicCodec + ?Sized> Converter<'a, C> {
    pub fn new(codec: &'a C, quality: JpegQuality) -> Self {
        Self {
            codec,
            quality,
            slots: Mutex::new(HashMap::new()),
            finished: Condvar::new(),
        }
    }

    /// Convert the file at `source`, deduplicating concurrent requests.
    ///
    /// Read errors and codec errors both surface as [`Conversion::Failed`];
    /// the convert stage records them per asset instead of aborting the run.
    pub fn convert(&self, source: &Path) -> Conversion {
        let mut slots = self.slots.lock().expect("slot table lock poisoned");
        loop {
            let in_flight = match slots.get(source) {
                Some(Slot::Finished(done)) => return done.clone(),
                Some(Slot::InFlight) => true,
                None => false,
            };
            if !in_flight {
                break;
            }
            slots = self
                .finished
                .wait(slots)
                .expect("slot table lock poisoned");
        }
        slots.insert(source.to_path_buf(), Slot::InFlight);
        drop(slots);

        // The codec runs without the lock so other sources keep converting.
        let outcome = self.run_codec(source);

        let mut slots = self.slots.lock().expect("slot table lock poisoned");
        slots.insert(source.to_path_buf(), Slot::Finished(outcome.clone()));
        self.finished.notify_all();
        outcome
    }

    fn run_codec(&self, source: &Path) -> Conversion {
        let bytes = match std::fs::read(source) {
            Ok(bytes) => bytes,
            Err(e) => return Conversion::Failed(format!("read failed: {e}")),
        };
        match self.codec.transcode(&bytes, self.quality) {
            Ok(jpeg) => Conversion::Ready(jpeg),
            Err(e) => Conversion::Failed(e.to_string()),
        }
    }
}
