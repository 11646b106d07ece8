/// Application-level constants
pub const APP_NAME: &str = "Imdaad";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

// ---------------------------------------------------------------------------
// National helplines
// ---------------------------------------------------------------------------

/// Rescue / general emergency helpline.
pub const RESCUE_HELPLINE: &str = "1122";
/// Police helpline.
pub const POLICE_HELPLINE: &str = "15";
/// Fire brigade helpline.
pub const FIRE_HELPLINE: &str = "16";

// ---------------------------------------------------------------------------
// Matching defaults
// ---------------------------------------------------------------------------

/// Maximum candidates fed into service selection per case.
pub const GUIDANCE_MAX_CANDIDATES: usize = 5;
/// Search radius for the guidance stage, in kilometers.
pub const GUIDANCE_MAX_DISTANCE_KM: f64 = 20.0;
/// Minimum shelter capacity used by the no-coordinates relief fallback.
pub const RELIEF_FALLBACK_MIN_CAPACITY: u32 = 50;

/// Cities recognized when extracting a city from a free-text location label.
pub const KNOWN_CITIES: &[&str] = &[
    "karachi",
    "lahore",
    "islamabad",
    "peshawar",
    "multan",
    "quetta",
];

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// Delay before the one-shot deferred follow-up fires, in minutes.
pub const FOLLOW_UP_DELAY_MINUTES: u64 = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helplines_are_short_codes() {
        assert_eq!(RESCUE_HELPLINE, "1122");
        assert_eq!(POLICE_HELPLINE, "15");
        assert_eq!(FIRE_HELPLINE, "16");
    }

    #[test]
    fn default_filter_scoped_to_crate() {
        assert!(default_log_filter().starts_with("imdaad"));
    }

    #[test]
    fn guidance_window_is_sane() {
        assert!(GUIDANCE_MAX_CANDIDATES >= 1);
        assert!(GUIDANCE_MAX_DISTANCE_KM > 0.0);
    }
}
