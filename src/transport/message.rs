//! The envelope carried over the persistent connection.
//!
//! Every frame is `{ "type": string, "data": <any> }`. The envelope layer
//! only checks that shape. An unknown `type` decodes like any other, and it
//! is up to the receiver to accept or reject it.
//!
//! Nesting is capped at [`MAX_DEPTH`] container levels inside `data`, on
//! both the encoding and the decoding side, so anything [`WsMessage::to_json`]
//! produces decodes again.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tungstenite::protocol::Message as Frame;

use crate::utils::{Error, Result};

/// Deepest array/object nesting accepted inside `data`.
pub const MAX_DEPTH: usize = 1024;

/// Generic envelope for all post-authentication traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsMessage {
    /// Discriminator selecting how `data` is interpreted.
    #[serde(rename = "type")]
    pub kind: String,

    /// Kind-specific body, left undecoded until the receiver asks for it.
    #[serde(default)]
    pub data: Value,
}

/// A payload type bound to one `type` discriminator.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Connect { endpoint: String }
///
/// impl MessageKind for Connect {
///     const TYPE: &'static str = "newt/wg/connect";
/// }
/// ```
pub trait MessageKind: Serialize + DeserializeOwned {
    const TYPE: &'static str;
}

impl WsMessage {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Builds an envelope from any serializable payload.
    pub fn with_payload<T: Serialize>(kind: impl Into<String>, payload: &T) -> Result<Self> {
        let kind = kind.into();
        let data = serde_json::to_value(payload).map_err(|source| Error::Payload {
            kind: kind.clone(),
            source,
        })?;
        Ok(Self { kind, data })
    }

    pub fn typed<M: MessageKind>(message: &M) -> Result<Self> {
        Self::with_payload(M::TYPE, message)
    }

    pub fn is<M: MessageKind>(&self) -> bool {
        self.kind == M::TYPE
    }

    /// Decodes `data` as `T` without looking at the discriminator.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.data).map_err(|source| Error::Payload {
            kind: self.kind.clone(),
            source,
        })
    }

    /// Second decoding stage: checks `type` against `M::TYPE`, then decodes
    /// the payload.
    pub fn decode<M: MessageKind>(&self) -> Result<M> {
        if !self.is::<M>() {
            return Err(Error::UnexpectedType {
                expected: M::TYPE.to_string(),
                found: self.kind.clone(),
            });
        }
        self.payload()
    }

    pub fn to_json(&self) -> Result<String> {
        if value_depth(&self.data) > MAX_DEPTH {
            return Err(Error::NestingTooDeep { limit: MAX_DEPTH });
        }
        serde_json::to_string(self).map_err(Error::MalformedEnvelope)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_slice(text.as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        // the envelope object itself is one level above `data`
        if frame_depth(bytes, MAX_DEPTH + 1) > MAX_DEPTH + 1 {
            return Err(Error::NestingTooDeep { limit: MAX_DEPTH });
        }

        let mut de = serde_json::Deserializer::from_slice(bytes);
        de.disable_recursion_limit();
        let message = Self::deserialize(serde_stacker::Deserializer::new(&mut de))
            .map_err(Error::MalformedEnvelope)?;
        de.end().map_err(Error::MalformedEnvelope)?;
        Ok(message)
    }

    pub fn to_frame(&self) -> Result<Frame> {
        Ok(Frame::text(self.to_json()?))
    }

    /// Decodes a WebSocket frame. Text and binary frames carry envelopes;
    /// control frames return `None`.
    pub fn from_frame(frame: &Frame) -> Option<Result<Self>> {
        match frame {
            Frame::Text(text) => Some(Self::from_json(text.as_str())),
            Frame::Binary(bytes) => Some(Self::from_slice(bytes)),
            _ => None,
        }
    }
}

fn value_depth(value: &Value) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(value, 1usize)];
    while let Some((value, level)) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items.iter().map(|v| (v, level + 1))),
            Value::Object(map) => pending.extend(map.values().map(|v| (v, level + 1))),
            _ => continue,
        }
        deepest = deepest.max(level);
    }
    deepest
}

/// Container depth of raw JSON text, counting brackets outside strings.
/// Stops early once `limit` is exceeded.
fn frame_depth(bytes: &[u8], limit: usize) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
                if deepest > limit {
                    break;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}
