use crate::application::correlator::{HostMessage, OutboundMessage, Reply};
use crate::domain::host::{CorrelationToken, HostEvent, HostResponse};
use crate::error::{BridgeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct RawHostMessage {
    identifier: String,
    event: String,
    #[serde(default)]
    content: serde_json::Value,
}

#[derive(Serialize)]
struct WireReply<'a> {
    identifier: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a HostResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<String>,
}

fn payload<T: DeserializeOwned>(kind: &str, content: serde_json::Value) -> Result<T> {
    serde_json::from_value(content)
        .map_err(|e| BridgeError::MalformedMessage(format!("{kind} payload: {e}")))
}

/// Decodes one host message:
/// `{"identifier": "<token>", "event": "<kind>", "content": <payload>}`.
pub fn decode(raw: &str) -> Result<HostMessage> {
    let message: RawHostMessage =
        serde_json::from_str(raw).map_err(|e| BridgeError::MalformedMessage(e.to_string()))?;
    let token = CorrelationToken::parse(message.identifier).ok_or_else(|| {
        BridgeError::MalformedMessage("missing correlation identifier".to_string())
    })?;

    let kind = message.event.as_str();
    let event = match kind {
        "shipping_identifier_update" => {
            HostEvent::ShippingIdentifierUpdate(payload(kind, message.content)?)
        }
        "shipping_contact_update" => {
            HostEvent::ShippingContactUpdate(payload(kind, message.content)?)
        }
        "payment_authorization" => HostEvent::PaymentAuthorization(payload(kind, message.content)?),
        "session_terminated" => HostEvent::SessionTerminated(payload(kind, message.content)?),
        other => return Err(BridgeError::UnknownEvent(other.to_string())),
    };

    Ok(HostMessage { token, event })
}

/// Encodes a reply as a single JSON line.
pub fn encode(message: &OutboundMessage) -> Result<String> {
    let wire = match &message.reply {
        Reply::Response(response) => WireReply {
            identifier: message.token.as_str(),
            response: Some(response),
            rejected: None,
        },
        Reply::Rejected(err) => WireReply {
            identifier: message.token.as_str(),
            response: None,
            rejected: Some(err.to_string()),
        },
    };
    Ok(serde_json::to_string(&wire)?)
}
