//! Logging infrastructure for the Pocket Camera core.
//!
//! Categorized, optionally rate-limited logging. In the browser build messages
//! go to the developer console; native builds forward to the `log` facade with
//! the category as the target, so the host decides where output ends up.

use std::sync::atomic::{AtomicU32, Ordering};

/// Log categories for filtering and rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum LogCategory {
    Camera,
    Mbc,
    General,
}

impl LogCategory {
    #[cfg_attr(not(all(target_arch = "wasm32", feature = "wasm")), allow(dead_code))]
    fn prefix(self) -> &'static str {
        match self {
            LogCategory::Camera => "[Camera]",
            LogCategory::Mbc => "[MBC]",
            LogCategory::General => "[EMU]",
        }
    }

    #[cfg_attr(all(target_arch = "wasm32", feature = "wasm"), allow(dead_code))]
    fn target(self) -> &'static str {
        match self {
            LogCategory::Camera => "gb_pocketcam::camera",
            LogCategory::Mbc => "gb_pocketcam::mbc",
            LogCategory::General => "gb_pocketcam",
        }
    }
}

/// Rate limiter that tracks how many times a particular log point has been hit.
pub struct RateLimiter {
    counter: AtomicU32,
    limit: u32,
}

impl RateLimiter {
    /// Create a new rate limiter that allows `limit` messages.
    pub const fn new(limit: u32) -> Self {
        RateLimiter {
            counter: AtomicU32::new(0),
            limit,
        }
    }

    /// Check if we should log. Returns true if under the limit.
    pub fn should_log(&self) -> bool {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        count < self.limit
    }

    /// Get current count without incrementing.
    #[allow(dead_code)]
    pub fn count(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Logger front end shared by the macros below.
pub struct Logger;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
impl Logger {
    pub fn info(category: LogCategory, msg: &str) {
        let formatted = format!("{} {}", category.prefix(), msg);
        web_sys::console::log_1(&formatted.into());
    }

    pub fn warn(category: LogCategory, msg: &str) {
        let formatted = format!("{} {}", category.prefix(), msg);
        web_sys::console::warn_1(&formatted.into());
    }

    pub fn debug(category: LogCategory, msg: &str) {
        let formatted = format!("{} {}", category.prefix(), msg);
        web_sys::console::debug_1(&formatted.into());
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
impl Logger {
    pub fn info(category: LogCategory, msg: &str) {
        ::log::info!(target: category.target(), "{msg}");
    }

    pub fn warn(category: LogCategory, msg: &str) {
        ::log::warn!(target: category.target(), "{msg}");
    }

    pub fn debug(category: LogCategory, msg: &str) {
        ::log::debug!(target: category.target(), "{msg}");
    }
}

impl Logger {
    /// Log with rate limiting.
    pub fn info_limited(category: LogCategory, limiter: &RateLimiter, msg: &str) {
        if limiter.should_log() {
            Self::info(category, msg);
        }
    }
}

/// Convenience macros for logging.
#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::Logger::info($cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::Logger::warn($cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::Logger::debug($cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info_limited {
    ($cat:expr, $limiter:expr, $($arg:tt)*) => {
        $crate::log::Logger::info_limited($cat, $limiter, &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_stops_after_limit() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.should_log());
        assert!(limiter.should_log());
        assert!(!limiter.should_log());
        assert_eq!(limiter.count(), 3);
    }

    #[test]
    fn test_category_targets() {
        assert_eq!(LogCategory::Camera.target(), "gb_pocketcam::camera");
        assert_eq!(LogCategory::Mbc.prefix(), "[MBC]");
    }
}
