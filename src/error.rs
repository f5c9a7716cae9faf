/// Broad category of an [`AppError`].
///
/// The category decides the process exit code and lets callers tell a
/// per-row remote failure apart from a failure of the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No input file was chosen.
    MissingInput,
    /// The input file could not be parsed as CSV.
    Parse,
    /// A call to the remote prediction service failed.
    Remote,
    /// Invalid configuration (base URL, API key header, ...).
    Config,
    /// Local file I/O failed (export).
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::MissingInput | ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::Parse => 3,
            ErrorKind::Remote => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingInput, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::missing_input("x").exit_code(), 2);
        assert_eq!(AppError::parse("x").exit_code(), 3);
        assert_eq!(AppError::remote("x").exit_code(), 4);
        assert_eq!(AppError::io("x").kind(), ErrorKind::Io);
        assert_eq!(AppError::config("bad url").to_string(), "bad url");
    }
}
