//! Hub data validation
//!
//! Checks applied when hub records are loaded into the store: link
//! targets must be plain http(s) URLs and slugs must be URL-safe.

use url::Url;

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &["javascript:", "data:", "file:", "vbscript:", "blob:"];

/// slug 最大长度
pub const MAX_SLUG_LEN: usize = 50;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUrl,
    DangerousProtocol(String),
    InvalidProtocol(String),
    InvalidFormat(String),
    InvalidSlug(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::DangerousProtocol(proto) => write!(f, "Dangerous protocol blocked: {}", proto),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
            Self::InvalidSlug(slug) => write!(
                f,
                "Invalid slug '{}': use 1-{} lowercase letters, digits, '-' or '_'",
                slug, MAX_SLUG_LEN
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证链接目标 URL
pub fn validate_link_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let lower = url.to_ascii_lowercase();
    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| lower.starts_with(*p)) {
        return Err(ValidationError::DangerousProtocol(proto.to_string()));
    }

    let parsed = Url::parse(url).map_err(|e| ValidationError::InvalidFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::InvalidProtocol(format!("{}:", other))),
    }
}

/// slug 比较不区分大小写，存储前统一转小写
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_ascii_lowercase()
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidSlug(slug.to_string()))
    }
}
