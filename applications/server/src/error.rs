/// Server error types
use airwave_core::StationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcoding error: {0}")]
    Transcoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Station error: {0}")]
    Station(#[from] StationError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::Station(e) => match e {
                StationError::EmptyPlaylist => (StatusCode::NOT_FOUND, e.to_string()),
                StationError::TrackNotReady => (StatusCode::CONFLICT, e.to_string()),
                StationError::Stopped => {
                    tracing::error!("Broadcast engine is not running");
                    (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
                }
            },
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Transcoding(ref msg) => {
                tracing::error!("Transcoding error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Transcoding error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_errors_map_to_status_codes() {
        let cases = [
            (StationError::EmptyPlaylist, StatusCode::NOT_FOUND),
            (StationError::TrackNotReady, StatusCode::CONFLICT),
            (StationError::Stopped, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, status) in cases {
            let response = ServerError::from(error).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn io_errors_are_internal() {
        let error = std::io::Error::new(std::io::ErrorKind::NotFound, "ffmpeg");
        let response = ServerError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let response = ServerError::Internal("secret path".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
