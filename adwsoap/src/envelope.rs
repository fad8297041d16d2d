//! Envelope codec: canonical request encoding and response decoding.
//!
//! The request side is built by hand so the element order is stable: two
//! logically identical requests always serialize to identical bytes, which
//! is what makes response caching keyable on the raw request. The response
//! side walks the envelope with `quick_xml` and returns the content of the
//! `Body` element as an exact slice of the input, so the caller can decode
//! it against its own schema without the codec ever re-emitting it.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use crate::{SOAP_ENVELOPE_NS, SoapError};

/// Header block sent with every request.
///
/// Field names on the wire are an external contract: `userAgent`,
/// `developerToken`, `clientCustomerId`, `partialFailure`, `validateOnly`.
/// The two flags are omitted entirely when false, and `clientCustomerId`
/// is omitted when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeader {
    pub user_agent: String,
    pub developer_token: String,
    pub client_customer_id: Option<String>,
    pub partial_failure: bool,
    pub validate_only: bool,
}

/// Header block of a response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeader {
    pub request_id: String,
    pub service_name: String,
    pub method_name: String,
    pub operations: i64,
    pub response_time: i64,
}

/// Encode a request envelope.
///
/// `service_ns` is the namespace the header block is qualified with (the
/// base URL of the service group). `body` is the already-serialized
/// operation payload; it is inserted verbatim between `<s:Body>` tags and
/// must therefore be valid UTF-8, which is the only way this can fail.
pub fn encode_request(
    service_ns: &str,
    header: &RequestHeader,
    body: &[u8],
) -> Result<Vec<u8>, SoapError> {
    let body = std::str::from_utf8(body)?;

    let mut xml = String::with_capacity(body.len() + 512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(xml, r#"<s:Envelope xmlns:s="{}">"#, SOAP_ENVELOPE_NS);
    xml.push_str("<s:Header>");
    let _ = write!(xml, r#"<RequestHeader xmlns="{}">"#, escape(service_ns));

    push_field(&mut xml, "userAgent", &header.user_agent);
    push_field(&mut xml, "developerToken", &header.developer_token);
    if let Some(id) = &header.client_customer_id {
        push_field(&mut xml, "clientCustomerId", id);
    }
    if header.partial_failure {
        push_field(&mut xml, "partialFailure", "true");
    }
    if header.validate_only {
        push_field(&mut xml, "validateOnly", "true");
    }

    xml.push_str("</RequestHeader>");
    xml.push_str("</s:Header>");
    xml.push_str("<s:Body>");
    xml.push_str(body);
    xml.push_str("</s:Body>");
    xml.push_str("</s:Envelope>");

    Ok(xml.into_bytes())
}

fn push_field(xml: &mut String, name: &str, value: &str) {
    let _ = write!(xml, "<{name}>{}</{name}>", escape(value));
}

/// Decode a response envelope.
///
/// Returns the response header and the raw bytes found inside the `Body`
/// element, exactly as they appeared on the wire. The body is never
/// interpreted here: a fault payload, an operation result and garbage all
/// decode the same way as long as the envelope itself is well-formed.
pub fn decode_response(bytes: &[u8]) -> Result<(ResponseHeader, Vec<u8>), SoapError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut header = ResponseHeader::default();
    let mut inner: Option<Vec<u8>> = None;
    let mut saw_envelope = false;
    let mut in_header = false;
    let mut field: Option<&'static str> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SoapError::Parse(e.to_string()))?;
        match event {
            Event::Start(e) => {
                let name = e.local_name();
                let local = name.as_ref();
                if !saw_envelope {
                    if local != b"Envelope" {
                        return Err(SoapError::MissingEnvelope);
                    }
                    saw_envelope = true;
                } else if inner.is_none() && local == b"Body" {
                    let span = reader
                        .read_to_end(e.name())
                        .map_err(|e| SoapError::Parse(e.to_string()))?;
                    inner = Some(bytes[span.start as usize..span.end as usize].to_vec());
                } else if local == b"Header" {
                    in_header = true;
                } else if in_header {
                    field = header_field(local);
                }
            }
            Event::Empty(e) => {
                if saw_envelope && inner.is_none() && e.local_name().as_ref() == b"Body" {
                    inner = Some(Vec::new());
                }
            }
            Event::Text(t) => {
                if let Some(name) = field {
                    let value = t
                        .xml_content()
                        .map_err(|e| SoapError::Parse(e.to_string()))?;
                    set_header_field(&mut header, name, &value)?;
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"Header" {
                    in_header = false;
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_envelope {
        return Err(SoapError::MissingEnvelope);
    }
    let inner = inner.ok_or(SoapError::MissingBody)?;
    Ok((header, inner))
}

fn header_field(local: &[u8]) -> Option<&'static str> {
    match local {
        b"requestId" => Some("requestId"),
        b"serviceName" => Some("serviceName"),
        b"methodName" => Some("methodName"),
        b"operations" => Some("operations"),
        b"responseTime" => Some("responseTime"),
        _ => None,
    }
}

fn set_header_field(header: &mut ResponseHeader, name: &str, value: &str) -> Result<(), SoapError> {
    match name {
        "requestId" => header.request_id = value.to_string(),
        "serviceName" => header.service_name = value.to_string(),
        "methodName" => header.method_name = value.to_string(),
        "operations" => header.operations = parse_i64(name, value)?,
        "responseTime" => header.response_time = parse_i64(name, value)?,
        _ => {}
    }
    Ok(())
}

fn parse_i64(name: &str, value: &str) -> Result<i64, SoapError> {
    value
        .parse()
        .map_err(|_| SoapError::BadHeaderValue(name.to_string(), value.to_string()))
}
