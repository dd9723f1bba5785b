use thiserror::Error;

use gnss_rs::prelude::{Constellation, SV};
use std::io::Error as IoError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),

    #[error("formatting error: {0}")]
    Formatting(#[from] FormattingError),

    #[error("file i/o error: {0}")]
    FileIo(#[from] IoError),
}

/// Errors that may rise while decoding a single message.
/// All of them are recoverable: the containing stream continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodingError {
    /// Message number is not part of the RTCM-SSR subset.
    #[error("message {0} is not an rtcm-ssr message")]
    UnknownMessageNumber(u16),

    /// The bit schedule requested more bits than the payload holds.
    #[error("bit schedule exceeds payload size")]
    PayloadOverrun,

    /// The schedule left more than the byte-alignment padding behind.
    #[error("message {0} did not consume its payload entirely")]
    PayloadUnderrun(u16),

    /// Satellite count or layer count outside the wire format bounds.
    #[error("message {0} declares an invalid satellite or layer count")]
    InvalidCount(u16),

    /// A signal & tracking mode index with no entry in the
    /// constellation signal table. The signal entry is skipped,
    /// the rest of the message is retained.
    #[error("{0}: tracking mode {1} does not resolve")]
    UnresolvedTrackingMode(Constellation, u8),

    #[error("{0}: constellation not supported")]
    UnsupportedConstellation(Constellation),
}

/// Reasons for which a satellite is skipped at OSR time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OsrError {
    /// No ephemeris was ever received for this satellite.
    #[error("{0}: no ephemeris received")]
    MissingEphemeris(SV),

    /// Orbit propagation did not converge.
    #[error("{0}: orbit propagation diverged")]
    Diverged(SV),

    /// Satellite is below the local horizon.
    #[error("{0}: negative elevation")]
    BelowHorizon(SV),
}

/// Errors that may rise in the formatting process
#[derive(Error, Debug)]
pub enum FormattingError {
    #[error("i/o: output error")]
    OutputError(#[from] IoError),
}
