//! # Framework Errors
//!
//! Remote failures are classified exactly once, here, into the small closed
//! [`ErrorKind`] taxonomy the invocation host understands. Everything downstream of
//! [`classify`] works with the kind and the original message, never with raw codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical failure reported to the invocation host.
///
/// The variant names are the handler error codes a host expects on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ServiceLimitExceeded,
    InvalidRequest,
    NotFound,
    AlreadyExists,
    GeneralServiceException,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ServiceLimitExceeded => "ServiceLimitExceeded",
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::GeneralServiceException => "GeneralServiceException",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes the remote control service attaches to its API errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceErrorCode {
    ResourceLimitExceeded,
    InvalidParameter,
    InvalidRequest,
    UnsupportedAvailabilityZone,
    NotFound,
    ResourceNotFound,
    ResourceInUse,
    Client,
    Server,
    ServiceUnavailable,
    /// A code this crate does not know about, kept verbatim.
    Unrecognized(String),
}

impl ServiceErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceErrorCode::ResourceLimitExceeded => "ResourceLimitExceededException",
            ServiceErrorCode::InvalidParameter => "InvalidParameterException",
            ServiceErrorCode::InvalidRequest => "InvalidRequestException",
            ServiceErrorCode::UnsupportedAvailabilityZone => "UnsupportedAvailabilityZoneException",
            ServiceErrorCode::NotFound => "NotFoundException",
            ServiceErrorCode::ResourceNotFound => "ResourceNotFoundException",
            ServiceErrorCode::ResourceInUse => "ResourceInUseException",
            ServiceErrorCode::Client => "ClientException",
            ServiceErrorCode::Server => "ServerException",
            ServiceErrorCode::ServiceUnavailable => "ServiceUnavailableException",
            ServiceErrorCode::Unrecognized(code) => code,
        }
    }

    /// Parses a wire code. Unknown codes are preserved as [`ServiceErrorCode::Unrecognized`].
    pub fn parse(code: &str) -> Self {
        match code {
            "ResourceLimitExceededException" => ServiceErrorCode::ResourceLimitExceeded,
            "InvalidParameterException" => ServiceErrorCode::InvalidParameter,
            "InvalidRequestException" => ServiceErrorCode::InvalidRequest,
            "UnsupportedAvailabilityZoneException" => ServiceErrorCode::UnsupportedAvailabilityZone,
            "NotFoundException" => ServiceErrorCode::NotFound,
            "ResourceNotFoundException" => ServiceErrorCode::ResourceNotFound,
            "ResourceInUseException" => ServiceErrorCode::ResourceInUse,
            "ClientException" => ServiceErrorCode::Client,
            "ServerException" => ServiceErrorCode::Server,
            "ServiceUnavailableException" => ServiceErrorCode::ServiceUnavailable,
            other => ServiceErrorCode::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call against the remote control service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with an API error.
    #[error("{code}: {message}")]
    Service {
        code: ServiceErrorCode,
        message: String,
    },
    /// The call never produced an API answer (connection, channel, decoding).
    #[error("transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn service(code: ServiceErrorCode, message: impl Into<String>) -> Self {
        RemoteError::Service {
            code,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        RemoteError::Transport(message.into())
    }

    /// The remote code, if this error came from the service API at all.
    pub fn code(&self) -> Option<&ServiceErrorCode> {
        match self {
            RemoteError::Service { code, .. } => Some(code),
            RemoteError::Transport(_) => None,
        }
    }

    /// True when the service reports that the named resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code(),
            Some(ServiceErrorCode::ResourceNotFound | ServiceErrorCode::NotFound)
        )
    }

    /// True when another operation on the resource is still in flight.
    pub fn is_resource_in_use(&self) -> bool {
        matches!(self.code(), Some(ServiceErrorCode::ResourceInUse))
    }

    pub fn kind(&self) -> ErrorKind {
        classify(self)
    }
}

/// Maps a remote error onto the host-facing taxonomy.
///
/// Non-API errors and unknown codes fall back to [`ErrorKind::GeneralServiceException`].
pub fn classify(error: &RemoteError) -> ErrorKind {
    match error.code() {
        Some(ServiceErrorCode::ResourceLimitExceeded) => ErrorKind::ServiceLimitExceeded,
        Some(ServiceErrorCode::InvalidParameter)
        | Some(ServiceErrorCode::UnsupportedAvailabilityZone) => ErrorKind::InvalidRequest,
        Some(ServiceErrorCode::NotFound) | Some(ServiceErrorCode::ResourceNotFound) => {
            ErrorKind::NotFound
        }
        Some(ServiceErrorCode::ResourceInUse) => ErrorKind::AlreadyExists,
        _ => ErrorKind::GeneralServiceException,
    }
}

/// Failure to decode a continuation context handed back by the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("continuation context is missing `{0}`")]
    MissingField(&'static str),
    #[error("continuation context field `{field}` must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Errors raised by the [`InvocationHost`](crate::host::InvocationHost) itself.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("operation still in progress after {0} invocations")]
    AttemptsExhausted(u32),
    #[error(transparent)]
    Context(#[from] ContextError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: &str) -> RemoteError {
        RemoteError::service(ServiceErrorCode::parse(code), "generated error")
    }

    #[test]
    fn test_classify_known_codes() {
        let cases = [
            ("ResourceLimitExceededException", ErrorKind::ServiceLimitExceeded),
            ("InvalidParameterException", ErrorKind::InvalidRequest),
            ("UnsupportedAvailabilityZoneException", ErrorKind::InvalidRequest),
            ("NotFoundException", ErrorKind::NotFound),
            ("ResourceNotFoundException", ErrorKind::NotFound),
            ("ResourceInUseException", ErrorKind::AlreadyExists),
            ("ClientException", ErrorKind::GeneralServiceException),
            ("ServerException", ErrorKind::GeneralServiceException),
            ("SomethingNewException", ErrorKind::GeneralServiceException),
        ];
        for (code, expected) in cases {
            assert_eq!(classify(&api_error(code)), expected, "code {code}");
        }
    }

    #[test]
    fn test_classify_non_remote_error() {
        let error = RemoteError::transport("connection reset");
        assert_eq!(classify(&error), ErrorKind::GeneralServiceException);
        assert!(error.code().is_none());
    }

    #[test]
    fn test_resource_not_found() {
        assert!(api_error("ResourceNotFoundException").is_not_found());
        assert!(!api_error("ResourceInUseException").is_not_found());
        assert!(!RemoteError::transport("arbitrary error").is_not_found());
    }

    #[test]
    fn test_unrecognized_code_round_trips_verbatim() {
        let code = ServiceErrorCode::parse("ThrottlingException");
        assert_eq!(code.as_str(), "ThrottlingException");
        assert_eq!(
            api_error("ResourceInUseException").to_string(),
            "ResourceInUseException: generated error"
        );
    }
}
