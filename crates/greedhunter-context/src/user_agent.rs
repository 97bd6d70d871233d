//! User-agent classification
//!
//! Case-insensitive substring matching, good enough for session device
//! tracking. An empty user-agent yields all-empty fields rather than
//! "Unknown" so absent data stays distinguishable from unrecognized data.

use serde::{Deserialize, Serialize};

/// Device profile derived from a user-agent string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UaProfile {
    /// "Mobile" or "Desktop"
    pub device: String,
    /// "Chrome", "Firefox", "Safari", "Edge" or "Unknown"
    pub browser: String,
    /// "Windows", "MacOS", "Linux", "Android", "iOS" or "Unknown"
    pub platform: String,
}

/// Classify a raw user-agent string
pub fn classify_user_agent(user_agent: &str) -> UaProfile {
    if user_agent.is_empty() {
        return UaProfile::default();
    }

    let ua = user_agent.to_lowercase();

    let browser = if ua.contains("chrome") && !ua.contains("edg") {
        "Chrome"
    } else if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("safari") && !ua.contains("chrome") {
        "Safari"
    } else if ua.contains("edg") {
        "Edge"
    } else {
        "Unknown"
    };

    let platform = if ua.contains("windows") {
        "Windows"
    } else if ua.contains("mac") {
        "MacOS"
    } else if ua.contains("linux") {
        "Linux"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") {
        "iOS"
    } else {
        "Unknown"
    };

    let device = if ua.contains("mobile") { "Mobile" } else { "Desktop" };

    UaProfile {
        device: device.to_string(),
        browser: browser.to_string(),
        platform: platform.to_string(),
    }
}
