#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config read error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config watch error: {0}")]
    WatchError(String),

    #[error("watched file disappeared: {0}")]
    WatchLost(String),

    #[error("not supported: {0}")]
    Unsupported(String),

    #[error("not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::Io("/tmp/missing.ini: permission denied".into());
        assert_eq!(
            err.to_string(),
            "config read error: /tmp/missing.ini: permission denied"
        );

        let err = ConfigError::ParseError("line 3: unterminated section header".into());
        assert_eq!(
            err.to_string(),
            "config parse error: line 3: unterminated section header"
        );

        let err = ConfigError::WatchError("inotify limit reached".into());
        assert_eq!(err.to_string(), "config watch error: inotify limit reached");

        let err = ConfigError::WatchLost("/etc/app/app.ini".into());
        assert_eq!(
            err.to_string(),
            "watched file disappeared: /etc/app/app.ini"
        );
    }

    #[test]
    fn backend_error_display() {
        let err = ConfigError::Unsupported("set is not implemented".into());
        assert_eq!(err.to_string(), "not supported: set is not implemented");

        let err = ConfigError::NotFound("key 'database/host'".into());
        assert_eq!(err.to_string(), "not found: key 'database/host'");
    }
}
