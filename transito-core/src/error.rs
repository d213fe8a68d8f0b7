use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),
    #[error("Line not found: {0}")]
    LineNotFound(String),
    #[error("Station '{station}' not found on line {line}")]
    StationNotFound { line: String, station: String },
    #[error("Stop not found: {0}")]
    StopNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

impl Error {
    /// Unknown vehicle, line, station or stop
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::VehicleNotFound(_)
                | Error::LineNotFound(_)
                | Error::StationNotFound { .. }
                | Error::StopNotFound(_)
        )
    }
}
