use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkhubError {
    ConfigLoad(String),
    HubFileLoad(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    GeoIpProvider(String),
    DateParse(String),
    ServerStartup(String),
}

impl LinkhubError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkhubError::ConfigLoad(_) => "E001",
            LinkhubError::HubFileLoad(_) => "E002",
            LinkhubError::FileOperation(_) => "E003",
            LinkhubError::Validation(_) => "E004",
            LinkhubError::NotFound(_) => "E005",
            LinkhubError::Serialization(_) => "E006",
            LinkhubError::GeoIpProvider(_) => "E007",
            LinkhubError::DateParse(_) => "E008",
            LinkhubError::ServerStartup(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkhubError::ConfigLoad(_) => "Configuration Load Error",
            LinkhubError::HubFileLoad(_) => "Hub File Load Error",
            LinkhubError::FileOperation(_) => "File Operation Error",
            LinkhubError::Validation(_) => "Validation Error",
            LinkhubError::NotFound(_) => "Resource Not Found",
            LinkhubError::Serialization(_) => "Serialization Error",
            LinkhubError::GeoIpProvider(_) => "GeoIP Provider Error",
            LinkhubError::DateParse(_) => "Date Parse Error",
            LinkhubError::ServerStartup(_) => "Server Startup Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkhubError::ConfigLoad(msg) => msg,
            LinkhubError::HubFileLoad(msg) => msg,
            LinkhubError::FileOperation(msg) => msg,
            LinkhubError::Validation(msg) => msg,
            LinkhubError::NotFound(msg) => msg,
            LinkhubError::Serialization(msg) => msg,
            LinkhubError::GeoIpProvider(msg) => msg,
            LinkhubError::DateParse(msg) => msg,
            LinkhubError::ServerStartup(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            LinkhubError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkhubError::Validation(_) | LinkhubError::DateParse(_) => StatusCode::BAD_REQUEST,
            LinkhubError::GeoIpProvider(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkhubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkhubError {}

// 便捷的构造函数
impl LinkhubError {
    pub fn config_load<T: Into<String>>(msg: T) -> Self {
        LinkhubError::ConfigLoad(msg.into())
    }

    pub fn hub_file_load<T: Into<String>>(msg: T) -> Self {
        LinkhubError::HubFileLoad(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkhubError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkhubError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Serialization(msg.into())
    }

    pub fn geoip_provider<T: Into<String>>(msg: T) -> Self {
        LinkhubError::GeoIpProvider(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DateParse(msg.into())
    }

    pub fn server_startup<T: Into<String>>(msg: T) -> Self {
        LinkhubError::ServerStartup(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for LinkhubError {
    fn from(err: std::io::Error) -> Self {
        LinkhubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkhubError {
    fn from(err: serde_json::Error) -> Self {
        LinkhubError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LinkhubError {
    fn from(err: toml::de::Error) -> Self {
        LinkhubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkhubError {
    fn from(err: chrono::ParseError) -> Self {
        LinkhubError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkhubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(LinkhubError::config_load("x").code(), "E001");
        assert_eq!(LinkhubError::not_found("x").code(), "E005");
        assert_eq!(LinkhubError::server_startup("x").code(), "E009");
    }

    #[test]
    fn test_format_simple() {
        let err = LinkhubError::not_found("hub 'demo' not found");
        assert_eq!(err.to_string(), "Resource Not Found: hub 'demo' not found");
    }

    #[test]
    fn test_http_status() {
        use actix_web::http::StatusCode;
        assert_eq!(LinkhubError::not_found("x").http_status(), StatusCode::NOT_FOUND);
        assert_eq!(LinkhubError::validation("x").http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            LinkhubError::hub_file_load("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LinkhubError = io.into();
        assert_eq!(err.code(), "E003");
        assert_eq!(err.message(), "missing");
    }
}
