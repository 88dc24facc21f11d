//! Mutex-guarded accumulation buffer shared by the audio callback and consumers.
//!
//! The producer only appends; a consumer only swaps the whole contents out.
//! Between two takes the buffer holds exactly the batches appended since the
//! previous take, in arrival order. Growth is unbounded here; draining often
//! enough is the consumer's job.

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct SharedAudioBuffer {
    samples: Mutex<Vec<f32>>,
}

impl SharedAudioBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the backing storage to avoid early reallocation on the audio thread.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Append a batch at the end. Producer side.
    pub fn append(&self, batch: &[f32]) {
        self.samples.lock().extend_from_slice(batch);
    }

    /// Swap out everything accumulated since the previous take, leaving the
    /// buffer empty. Consumer side.
    pub fn take_all(&self) -> Vec<f32> {
        std::mem::take(&mut *self.samples.lock())
    }

    /// Drop accumulated samples in place, keeping the allocation.
    pub fn clear(&self) {
        self.samples.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn take_returns_appends_in_order() {
        let buf = SharedAudioBuffer::new();
        buf.append(&[0.1, 0.2]);
        buf.append(&[0.3]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.take_all(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn second_take_is_empty() {
        let buf = SharedAudioBuffer::with_capacity(16);
        buf.append(&[1.0; 4]);
        assert!(!buf.take_all().is_empty());
        assert!(buf.take_all().is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn clear_discards_contents() {
        let buf = SharedAudioBuffer::new();
        buf.append(&[0.5; 8]);
        buf.clear();
        assert!(buf.take_all().is_empty());
    }

    #[test]
    fn concurrent_takes_lose_nothing() {
        const BATCHES: usize = 2_000;
        const BATCH: usize = 64;

        let buf = Arc::new(SharedAudioBuffer::new());
        let producer = {
            let buf = Arc::clone(&buf);
            thread::spawn(move || {
                for b in 0..BATCHES {
                    let batch: Vec<f32> = (0..BATCH).map(|i| (b * BATCH + i) as f32).collect();
                    buf.append(&batch);
                }
            })
        };

        let mut drained = Vec::with_capacity(BATCHES * BATCH);
        while !producer.is_finished() {
            drained.extend(buf.take_all());
            thread::yield_now();
        }
        producer.join().expect("producer thread panicked");
        drained.extend(buf.take_all());

        let expected: Vec<f32> = (0..BATCHES * BATCH).map(|i| i as f32).collect();
        assert_eq!(drained, expected);
    }
}
