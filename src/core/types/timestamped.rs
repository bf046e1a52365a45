//! Generic wrapper pairing data with an acquisition timestamp.

/// Data tagged with the microsecond timestamp it was produced at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamped<T> {
    pub data: T,
    pub timestamp_us: u64,
}

impl<T> Timestamped<T> {
    pub fn new(data: T, timestamp_us: u64) -> Self {
        Self { data, timestamp_us }
    }

    /// Transform the payload while keeping the timestamp.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Timestamped<U> {
        Timestamped {
            data: f(self.data),
            timestamp_us: self.timestamp_us,
        }
    }
}
