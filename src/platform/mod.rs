//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Monotonic time (fallback clock when no audio device exists)
//! - Run seeds

/// Monotonic seconds since an arbitrary origin (performance.now on web)
#[cfg(target_arch = "wasm32")]
pub fn now_secs() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

/// Monotonic seconds since the first call in this process
#[cfg(not(target_arch = "wasm32"))]
pub fn now_secs() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Seed for a fresh run
#[cfg(target_arch = "wasm32")]
pub fn run_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
