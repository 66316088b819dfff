//! Device detection from User-Agent
//!
//! Maps a User-Agent string to a [`DeviceClass`] using woothee, with a
//! tablet pass first since woothee reports most tablets as smartphones.

use woothee::parser::Parser;

use crate::engine::DeviceClass;

/// 平板特征（优先于手机判断）
const TABLET_MARKERS: &[&str] = &["ipad", "tablet", "kindle", "silk", "playbook"];

/// 常见爬虫 / 自动化客户端特征
const BOT_MARKERS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "curl",
    "wget",
    "python-requests",
    "python-urllib",
    "headless",
    "phantom",
    "selenium",
    "puppeteer",
    "slurp",
    "facebookexternalhit",
];

pub struct DeviceDetector {
    parser: Parser,
}

impl Default for DeviceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDetector {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    /// Detect device class; empty UA is treated as desktop.
    pub fn detect(&self, user_agent: &str) -> DeviceClass {
        if user_agent.trim().is_empty() {
            return DeviceClass::Desktop;
        }

        let lower = user_agent.to_ascii_lowercase();
        if TABLET_MARKERS.iter().any(|m| lower.contains(m))
            || (lower.contains("android") && !lower.contains("mobile"))
        {
            return DeviceClass::Tablet;
        }

        let result = self.parser.parse(user_agent).unwrap_or_default();
        match result.category {
            "smartphone" | "mobilephone" => DeviceClass::Mobile,
            _ => DeviceClass::Desktop,
        }
    }

    /// Bot check used by visit/click tracking; an empty UA counts as a bot.
    pub fn is_bot(&self, user_agent: &str) -> bool {
        if user_agent.trim().is_empty() {
            return true;
        }

        let lower = user_agent.to_ascii_lowercase();
        if BOT_MARKERS.iter().any(|m| lower.contains(m)) {
            return true;
        }

        self.parser
            .parse(user_agent)
            .is_some_and(|r| r.category == "crawler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
    const DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const GOOGLEBOT: &str =
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_detect_mobile() {
        let detector = DeviceDetector::new();
        assert_eq!(detector.detect(IPHONE), DeviceClass::Mobile);
        assert_eq!(detector.detect(ANDROID_PHONE), DeviceClass::Mobile);
    }

    #[test]
    fn test_detect_tablet_before_mobile() {
        let detector = DeviceDetector::new();
        assert_eq!(detector.detect(IPAD), DeviceClass::Tablet);
        assert_eq!(detector.detect(ANDROID_TABLET), DeviceClass::Tablet);
    }

    #[test]
    fn test_detect_desktop_and_empty() {
        let detector = DeviceDetector::new();
        assert_eq!(detector.detect(DESKTOP), DeviceClass::Desktop);
        assert_eq!(detector.detect(""), DeviceClass::Desktop);
    }

    #[test]
    fn test_bot_detection() {
        let detector = DeviceDetector::new();
        assert!(detector.is_bot(GOOGLEBOT));
        assert!(detector.is_bot("curl/8.4.0"));
        assert!(detector.is_bot(""));
        assert!(!detector.is_bot(IPHONE));
        assert!(!detector.is_bot(DESKTOP));
    }
}
