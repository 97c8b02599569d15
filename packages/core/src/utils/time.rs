// Источник времени
//
// Вся логика TTL и timestamp читает время через `Clock`, чтобы тесты могли
// сдвигать его вручную.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Unix-время в миллисекундах
pub trait Clock: Send + Sync + Debug + 'static {
    fn now_millis(&self) -> i64;
}

/// Системные часы (UTC)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        current_timestamp_millis()
    }
}

/// Часы, которые двигаются только вручную
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Стартовать с текущего системного времени
    pub fn starting_now() -> Self {
        Self::new(current_timestamp_millis())
    }

    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| Some(now.saturating_add(by)));
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
