//! Declared API faults: parsing and classification.
//!
//! On the error statuses the service answers with a SOAP Fault whose
//! `detail` section carries a list of API error entries. The parser here is
//! deliberately tolerant: elements are matched by local name only, because
//! the body handed to it is a slice of a larger envelope and any namespace
//! prefixes it uses were declared further up, outside the slice.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::SoapError;

/// A single API error entry inside a fault's detail section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultEntry {
    /// Concrete error type, e.g. `InternalApiError` or `RequiredError`.
    pub error_type: String,
    /// Reason code within the error type, e.g. `UNEXPECTED_INTERNAL_API_ERROR`.
    pub reason: String,
    /// Human-readable error text.
    pub message: String,
}

/// A declared SOAP Fault with its API error entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    pub fault_code: String,
    pub fault_string: String,
    pub entries: Vec<FaultEntry>,
}

/// The fault families the transport layer knows how to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFaultKind {
    Authentication,
    RateExceeded,
    Database,
    InternalApi,
}

impl ApiFaultKind {
    /// Map a wire `errorType` value to a known kind, by exact equality.
    pub fn from_error_type(error_type: &str) -> Option<Self> {
        match error_type {
            "AuthenticationError" => Some(ApiFaultKind::Authentication),
            "RateExceededError" => Some(ApiFaultKind::RateExceeded),
            "DatabaseError" => Some(ApiFaultKind::Database),
            "InternalApiError" => Some(ApiFaultKind::InternalApi),
            _ => None,
        }
    }
}

impl fmt::Display for ApiFaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiFaultKind::Authentication => "AuthenticationError",
            ApiFaultKind::RateExceeded => "RateExceededError",
            ApiFaultKind::Database => "DatabaseError",
            ApiFaultKind::InternalApi => "InternalApiError",
        };
        f.write_str(name)
    }
}

/// Outcome of classifying a fault body.
///
/// The original fault payload is preserved in every variant that has one,
/// so callers can still inspect entries the classifier did not act on.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiFault {
    #[error("{kind} fault: {reason}")]
    Classified {
        kind: ApiFaultKind,
        reason: String,
        fault: Fault,
    },

    #[error("SOAP fault: {0}")]
    Generic(String),

    #[error("API fault with {} error entries", .0.entries.len())]
    Unclassified(Fault),
}

/// Parse a fault body into a [`Fault`].
///
/// Fails with [`SoapError::MissingFault`] when the body contains no Fault
/// element at all.
pub fn parse_fault(body: &[u8]) -> Result<Fault, SoapError> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut fault = Fault::default();
    let mut saw_fault = false;
    let mut in_entry = false;
    let mut entry = FaultEntry::default();
    let mut field: Option<&'static str> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SoapError::Parse(e.to_string()))?;
        match event {
            Event::Start(e) => {
                let name = e.local_name();
                let local = name.as_ref();
                field = None;
                if local == b"Fault" {
                    saw_fault = true;
                } else if saw_fault && local == b"errors" {
                    in_entry = true;
                    entry = FaultEntry::default();
                    // The concrete error type may be declared as an
                    // xsi:type attribute rather than a child element.
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"type" {
                            entry.error_type = attr
                                .unescape_value()
                                .map_err(|e| SoapError::Parse(e.to_string()))?
                                .into_owned();
                        }
                    }
                } else if in_entry {
                    field = match local {
                        b"reason" => Some("reason"),
                        b"errorString" => Some("errorString"),
                        _ if local.ends_with(b".Type") => Some("type"),
                        _ => None,
                    };
                } else if saw_fault {
                    field = match local {
                        b"faultcode" => Some("faultcode"),
                        b"faultstring" => Some("faultstring"),
                        _ => None,
                    };
                }
            }
            Event::Text(t) => {
                if let Some(name) = field {
                    let value = t
                        .xml_content()
                        .map_err(|e| SoapError::Parse(e.to_string()))?
                        .into_owned();
                    match name {
                        "faultcode" => fault.fault_code = value,
                        "faultstring" => fault.fault_string = value,
                        "reason" => entry.reason = value,
                        "errorString" => entry.message = value,
                        "type" => entry.error_type = value,
                        _ => {}
                    }
                }
            }
            Event::End(e) => {
                if in_entry && e.local_name().as_ref() == b"errors" {
                    fault.entries.push(std::mem::take(&mut entry));
                    in_entry = false;
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_fault {
        return Err(SoapError::MissingFault);
    }
    Ok(fault)
}

/// Classify a fault body into a typed [`ApiFault`].
///
/// The first entry whose error type is one of the known kinds wins, in
/// entry order. A fault without entries but with a fault string becomes
/// [`ApiFault::Generic`]; anything else is returned whole as
/// [`ApiFault::Unclassified`].
pub fn classify_fault(body: &[u8]) -> Result<ApiFault, SoapError> {
    let fault = parse_fault(body)?;

    let matched = fault.entries.iter().find_map(|e| {
        ApiFaultKind::from_error_type(&e.error_type).map(|kind| (kind, e.reason.clone()))
    });
    if let Some((kind, reason)) = matched {
        return Ok(ApiFault::Classified {
            kind,
            reason,
            fault,
        });
    }

    if fault.entries.is_empty() && !fault.fault_string.is_empty() {
        return Ok(ApiFault::Generic(fault.fault_string));
    }

    Ok(ApiFault::Unclassified(fault))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault_body(entries: &str) -> String {
        format!(
            r#"<soap:Fault>
  <faultcode>soap:Server</faultcode>
  <faultstring>[InternalApiError.UNEXPECTED_INTERNAL_API_ERROR @ ; trigger:'']</faultstring>
  <detail>
    <ApiExceptionFault xmlns="https://ads.example.com/api/cm/v201809">
      <message>Fault occurred</message>
      <ApplicationException.Type>ApiException</ApplicationException.Type>
      {entries}
    </ApiExceptionFault>
  </detail>
</soap:Fault>"#
        )
    }

    fn entry(error_type: &str, reason: &str) -> String {
        format!(
            r#"<errors xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="{error_type}">
  <fieldPath></fieldPath>
  <trigger></trigger>
  <errorString>{error_type}.{reason}</errorString>
  <ApiError.Type>{error_type}</ApiError.Type>
  <reason>{reason}</reason>
</errors>"#
        )
    }

    #[test]
    fn test_parse_fault_entries() {
        let body = fault_body(&entry("InternalApiError", "UNEXPECTED_INTERNAL_API_ERROR"));
        let fault = parse_fault(body.as_bytes()).unwrap();

        assert_eq!(fault.fault_code, "soap:Server");
        assert!(fault.fault_string.contains("InternalApiError"));
        assert_eq!(fault.entries.len(), 1);
        assert_eq!(fault.entries[0].error_type, "InternalApiError");
        assert_eq!(fault.entries[0].reason, "UNEXPECTED_INTERNAL_API_ERROR");
        assert_eq!(
            fault.entries[0].message,
            "InternalApiError.UNEXPECTED_INTERNAL_API_ERROR"
        );
    }

    #[test]
    fn test_parse_fault_type_from_attribute_only() {
        let body = fault_body(
            r#"<errors xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="DatabaseError">
  <reason>CONCURRENT_MODIFICATION</reason>
</errors>"#,
        );
        let fault = parse_fault(body.as_bytes()).unwrap();
        assert_eq!(fault.entries[0].error_type, "DatabaseError");
        assert_eq!(fault.entries[0].reason, "CONCURRENT_MODIFICATION");
    }

    #[test]
    fn test_classify_first_matching_entry_wins() {
        let entries = format!(
            "{}{}",
            entry("RequiredError", "REQUIRED"),
            entry("RateExceededError", "RATE_EXCEEDED")
        );
        let body = fault_body(&entries);

        match classify_fault(body.as_bytes()).unwrap() {
            ApiFault::Classified {
                kind,
                reason,
                fault,
            } => {
                assert_eq!(kind, ApiFaultKind::RateExceeded);
                assert_eq!(reason, "RATE_EXCEEDED");
                // Both entries survive classification.
                assert_eq!(fault.entries.len(), 2);
            }
            other => panic!("expected classified fault, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_internal_api_error() {
        let body = fault_body(&entry("InternalApiError", "X"));
        match classify_fault(body.as_bytes()).unwrap() {
            ApiFault::Classified { kind, reason, .. } => {
                assert_eq!(kind, ApiFaultKind::InternalApi);
                assert_eq!(reason, "X");
            }
            other => panic!("expected classified fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_fault_unescapes_text() {
        let body = r#"<soap:Fault>
  <faultcode>soap:Client</faultcode>
  <faultstring>bad &amp; worse &lt;selector&gt;</faultstring>
</soap:Fault>"#;
        let fault = parse_fault(body.as_bytes()).unwrap();
        assert_eq!(fault.fault_string, "bad & worse <selector>");
    }

    #[test]
    fn test_classify_generic_when_no_entries() {
        let body = r#"<soap:Fault>
  <faultcode>soap:Client</faultcode>
  <faultstring>Unmarshalling Error</faultstring>
</soap:Fault>"#;
        match classify_fault(body.as_bytes()).unwrap() {
            ApiFault::Generic(message) => assert_eq!(message, "Unmarshalling Error"),
            other => panic!("expected generic fault, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_unknown_entries_pass_through() {
        let body = fault_body(&entry("RequiredError", "REQUIRED"));
        match classify_fault(body.as_bytes()).unwrap() {
            ApiFault::Unclassified(fault) => {
                assert_eq!(fault.entries.len(), 1);
                assert_eq!(fault.entries[0].error_type, "RequiredError");
            }
            other => panic!("expected unclassified fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_non_fault_body_is_an_error() {
        let err = parse_fault(b"<rval><entries>ok</entries></rval>").unwrap_err();
        assert!(matches!(err, SoapError::MissingFault));
    }
}
