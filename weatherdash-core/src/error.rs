use thiserror::Error;

/// Failures surfaced by a [`WeatherProvider`](crate::WeatherProvider).
///
/// Transport and payload problems are mapped into one of these kinds at the
/// client boundary; callers never see raw `reqwest` or `serde_json` errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WeatherError {
    /// Input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider has no data for the query (usually an unknown city).
    #[error("City not found: {query}")]
    NotFound { query: String },

    /// The provider rejected the API key.
    #[error("Weather provider rejected the API key")]
    Unauthorized,

    /// Network failure, timeout or a provider-side error status.
    #[error("Weather provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The response could not be mapped into the expected shape.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    /// Message suitable for showing to the user in place of the view.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::InvalidInput(reason) => reason.clone(),
            WeatherError::NotFound { query } => format!("City not found: {query}"),
            WeatherError::Unauthorized => "The weather provider rejected the API key.\n\
                 Hint: run `weatherdash configure` or set WEATHERDASH_API_KEY."
                .to_string(),
            WeatherError::ProviderUnavailable(_) => {
                "The weather service could not be reached. Please try again.".to_string()
            }
            WeatherError::MalformedResponse(_) => {
                "Failed to fetch weather: unexpected response from the provider.".to_string()
            }
        }
    }
}

/// Reasons the host could not supply a position.
///
/// None of these are shown to the user; they switch an attempt onto the
/// default-city path.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("location access denied")]
    Denied,

    #[error("location unavailable")]
    Unavailable,

    #[error("geolocation not supported")]
    Unsupported,
}

/// Durable storage write failure. Logged, never surfaced.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize storage contents: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
