//! Timestamp keys for stored colors

use std::sync::atomic::{AtomicI64, Ordering};

/// Issues millisecond Unix timestamps as store keys.
///
/// Keys are strictly increasing within one process: when the clock has not
/// moved past the last issued key, the next key is `last + 1`.
#[derive(Debug, Default)]
pub struct TimestampKeys {
    last: AtomicI64,
}

impl TimestampKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next key as its decimal string
    pub fn next(&self) -> String {
        self.next_millis().to_string()
    }

    fn next_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }
}
