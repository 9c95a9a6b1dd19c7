//! Error types for the delayed channel

use std::io;

use thiserror::Error;

/// Errors that can occur on a read event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Delay set is empty, so no delay can be chosen
    #[error("no delay values configured")]
    NoDelays,

    /// Caller-supplied destination cannot hold the payload
    #[error("destination too small: need {needed} bytes, have {available}")]
    DestinationTooSmall { needed: usize, available: usize },
}

impl From<ChannelError> for io::Error {
    fn from(err: ChannelError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ChannelError::NoDelays.to_string(), "no delay values configured");
        let err = ChannelError::DestinationTooSmall {
            needed: 6,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "destination too small: need 6 bytes, have 4"
        );
    }

    #[test]
    fn test_into_io_error_keeps_source() {
        let io_err: io::Error = ChannelError::NoDelays.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);

        let inner = io_err
            .get_ref()
            .and_then(|e| e.downcast_ref::<ChannelError>())
            .cloned();
        assert_eq!(inner, Some(ChannelError::NoDelays));
    }
}
