#![forbid(unsafe_code)]

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    Schema(&'static str),
    UnknownWorkspace,
    WorkspaceAlreadyExists,
    NodeAlreadyExists,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Schema(message) => write!(f, "schema: {message}"),
            Self::UnknownWorkspace => write!(f, "unknown workspace"),
            Self::WorkspaceAlreadyExists => write!(f, "workspace already exists"),
            Self::NodeAlreadyExists => {
                write!(f, "node already exists at this path and dimension context")
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
