//! # adwsoap - SOAP 1.1 envelope codec for the AdWords-style API
//!
//! This crate implements the wire layer shared by every service client:
//! building the canonical request envelope and taking a response envelope
//! apart again, plus the fault model the remote service declares on error
//! statuses.
//!
//! ## Features
//!
//! - Deterministic request-envelope encoding (stable element order)
//! - Response-envelope decoding with the body kept as raw, uninterpreted bytes
//! - Tolerant SOAP Fault parsing
//! - Classification of declared faults into typed API faults
//!
//! ## Architecture
//!
//! - [`RequestHeader`] / [`ResponseHeader`] : envelope header blocks
//! - [`encode_request`] / [`decode_response`] : the envelope codec
//! - [`Fault`] / [`FaultEntry`] : the declared fault payload
//! - [`ApiFault`] / [`ApiFaultKind`] : typed classification of a fault
//!
//! The codec never looks inside the body section. Whatever the caller hands
//! in is transmitted verbatim, and whatever the service answers with is
//! handed back verbatim; interpreting it (entity decoding, fault
//! classification) is a separate step.

mod envelope;
mod fault;

pub use envelope::{RequestHeader, ResponseHeader, decode_response, encode_request};
pub use fault::{ApiFault, ApiFaultKind, Fault, FaultEntry, classify_fault, parse_fault};

/// Namespace of the SOAP 1.1 envelope.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Errors produced by the envelope codec and the fault parser.
#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    /// The caller-supplied body bytes are not valid UTF-8 XML.
    #[error("request body is not valid UTF-8: {0}")]
    InvalidBody(#[from] std::str::Utf8Error),

    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("Invalid value for header field {0}: {1}")]
    BadHeaderValue(String, String),

    #[error("No SOAP Fault found in body")]
    MissingFault,
}
