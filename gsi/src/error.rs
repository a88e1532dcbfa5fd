/// The pushed body is not valid JSON (or not a JSON object).
#[derive(Debug)]
pub struct DecodeError(serde_json::Error);

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "decoding game state: {}", self.0)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// A required block is missing, the push cannot be processed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingMap,
    MissingPhaseCountdowns,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingMap => write!(f, "map data is missing"),
            Self::MissingPhaseCountdowns => write!(f, "phase countdown data is missing"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum DigestError {
    Decode(DecodeError),
    Validation(ValidationError),
}

impl From<DecodeError> for DigestError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<ValidationError> for DigestError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl core::fmt::Display for DigestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "{}", e),
            Self::Validation(e) => write!(f, "invalid game state: {}", e),
        }
    }
}

impl std::error::Error for DigestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Validation(e) => Some(e),
        }
    }
}
