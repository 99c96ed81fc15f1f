use pwmon_platform::DiscoveryError;

/// Every failure the engine reports. Each kind has a fixed display string
/// and a stable integer code for tooling that only passes codes around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[repr(i32)]
pub enum Error {
    #[error("Initialization failed")]
    InitFailed = -1,

    #[error("Library not initialized")]
    NotInitialized = -2,

    #[error("Sampling already running")]
    AlreadyRunning = -3,

    #[error("Sampling not running")]
    NotRunning = -4,

    #[error("Invalid sampling frequency")]
    InvalidFrequency = -5,

    #[error("No sensors found")]
    NoSensors = -6,

    #[error("File access error")]
    FileAccess = -7,

    #[error("Memory allocation error")]
    Memory = -8,

    #[error("Thread creation error")]
    ThreadCreateFailed = -9,
}

pub type Result<T> = std::result::Result<T, Error>;

const ALL: [Error; 9] = [
    Error::InitFailed,
    Error::NotInitialized,
    Error::AlreadyRunning,
    Error::NotRunning,
    Error::InvalidFrequency,
    Error::NoSensors,
    Error::FileAccess,
    Error::Memory,
    Error::ThreadCreateFailed,
];

impl Error {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        ALL.into_iter().find(|e| e.code() == code)
    }

    /// The fixed human-readable message for this error.
    pub fn message(self) -> &'static str {
        match self {
            Error::InitFailed => "Initialization failed",
            Error::NotInitialized => "Library not initialized",
            Error::AlreadyRunning => "Sampling already running",
            Error::NotRunning => "Sampling not running",
            Error::InvalidFrequency => "Invalid sampling frequency",
            Error::NoSensors => "No sensors found",
            Error::FileAccess => "File access error",
            Error::Memory => "Memory allocation error",
            Error::ThreadCreateFailed => "Thread creation error",
        }
    }
}

/// Renders a raw status code. `0` is success; unknown codes map to a
/// generic message.
pub fn error_string(code: i32) -> &'static str {
    if code == 0 {
        return "Success";
    }
    Error::from_code(code).map_or("Unknown error", Error::message)
}

impl From<DiscoveryError> for Error {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::NoSensors => Error::NoSensors,
            DiscoveryError::FileAccess => Error::FileAccess,
            DiscoveryError::Memory => Error::Memory,
        }
    }
}
