use std::path::PathBuf;
use thiserror::Error;

/// The three failure families a compilation run can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid fields in one of the sources
    MalformedInput,
    /// Numeric coercion failed while assembling the document
    Conversion,
    /// A source could not be read or the target could not be written
    IO,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParsingError(_) => ErrorKind::MalformedInput,
            _ => ErrorKind::IO,
        }
    }
}

#[derive(Debug, Error)]
pub enum FixtureReaderError {
    #[error("Could not open fixture source because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("FixtureReader failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Malformed fixture record in {path:?} (line {line}): {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("Malformed fixture source {path:?}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },
}

impl FixtureReaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadFilePath(_) | Self::IOError(_) => ErrorKind::IO,
            Self::MalformedRecord { .. } | Self::MalformedSource { .. } => {
                ErrorKind::MalformedInput
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum UniverseReaderError {
    #[error("Could not open universe source because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("UniverseReader failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Malformed universe source {path:?}: {source}")]
    ParsingError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Malformed universe {universe:?} in {path:?}: {reason}")]
    MalformedUniverse {
        path: PathBuf,
        universe: String,
        reason: String,
    },
}

impl UniverseReaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadFilePath(_) | Self::IOError(_) => ErrorKind::IO,
            Self::ParsingError { .. } | Self::MalformedUniverse { .. } => {
                ErrorKind::MalformedInput
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum GroupsError {
    #[error("Could not open groups file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Groups failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Groups failed due to fixture source error: {0}")]
    FixtureError(#[from] FixtureReaderError),
    #[error("Malformed group record in {path:?} (line {line}): {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("Groups failed to write {path:?}: {reason}")]
    WriteError { path: PathBuf, reason: String },
}

impl GroupsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FixtureError(e) => e.kind(),
            Self::MalformedRecord { .. } => ErrorKind::MalformedInput,
            _ => ErrorKind::IO,
        }
    }
}

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Fixture {index} ({model}) has universe {universe}, which cannot be converted to a 0-based universe")]
    Conversion {
        index: usize,
        model: String,
        universe: u32,
    },
    #[error("Fixture ID overflowed at fixture {index} with an ID start of {id_start}")]
    IdOverflow { index: usize, id_start: u32 },
    #[error("Channel group {category:?} references a fixture at universe {universe} address {address} which is not patched")]
    UnknownGroupMember {
        category: String,
        universe: u32,
        address: u32,
    },
}

impl AssemblerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conversion { .. } | Self::IdOverflow { .. } => ErrorKind::Conversion,
            Self::UnknownGroupMember { .. } => ErrorKind::MalformedInput,
        }
    }
}

#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("XMLWriter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("XMLWriter could not write to {path:?}: {source}")]
    BadTarget {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EmitterError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::IO
    }
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device detection backend is not available in this build")]
    BackendUnavailable,
    #[error("Device detection failed: {0}")]
    Enumeration(String),
}

/// Top level error of a compilation run. Each variant names the stage which failed.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Stage read-config failed: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Stage read-fixtures failed: {0}")]
    FixtureError(#[from] FixtureReaderError),
    #[error("Stage read-universes failed: {0}")]
    UniverseError(#[from] UniverseReaderError),
    #[error("Stage read-groups failed: {0}")]
    GroupsError(#[from] GroupsError),
    #[error("Stage assemble failed: {0}")]
    AssemblerError(#[from] AssemblerError),
    #[error("Stage emit failed: {0}")]
    EmitterError(#[from] EmitterError),
}

impl ProcessorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(e) => e.kind(),
            Self::FixtureError(e) => e.kind(),
            Self::UniverseError(e) => e.kind(),
            Self::GroupsError(e) => e.kind(),
            Self::AssemblerError(e) => e.kind(),
            Self::EmitterError(e) => e.kind(),
        }
    }

    /// The pipeline stage name, as used in the user facing message
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "read-config",
            Self::FixtureError(_) => "read-fixtures",
            Self::UniverseError(_) => "read-universes",
            Self::GroupsError(_) => "read-groups",
            Self::AssemblerError(_) => "assemble",
            Self::EmitterError(_) => "emit",
        }
    }
}
