//! Error definitions shared across library modules.
//! Decoding and encoding of the vendor frames is total and never fails; the
//! types below only cover frame construction at the transport boundary, raw
//! bit access, and hardware collaborators.
use thiserror_no_std::Error;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors raised while building an 11-bit CAN frame.
pub enum FrameError {
    /// Identifier does not fit in the 11-bit standard range.
    #[error("Invalid standard identifier: {id:#X}")]
    InvalidId { id: u32 },
    /// Extended (29-bit) identifiers are not used by the PCS buses.
    #[error("Extended identifiers are not supported")]
    ExtendedId,
    /// Classic CAN frames carry at most eight bytes.
    #[error("Payload too long -> asked: {len}, max: 8")]
    PayloadTooLong { len: usize },
}

//==================================================================================BITREADER_ERRORS
#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised during bitwise payload reads.
pub enum BitReaderError {
    /// Attempted to read past the end of the buffer.
    #[error("Attempted to read out of bounds -> asked: {asked}, available: {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Requested more bits than the target type can hold.
    #[error("Cannot read more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}

//==================================================================================BITWRITER_ERRORS
#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised during bitwise payload writes.
pub enum BitWriterError {
    /// Attempted to write beyond the provided capacity.
    #[error("Attempted to write out of bounds -> asked: {asked}, available: {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Field is too large for the provided type.
    #[error("Cannot write more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}

//==================================================================================CONTROLLER_ERRORS
#[derive(Debug, Error)]
/// Failures surfaced by the controller task entry points.
pub enum ControllerError<E: core::fmt::Debug> {
    /// The enable-line collaborator refused to drive a pin.
    #[error("Enable line error: {0:?}")]
    EnableLines(E),
}
