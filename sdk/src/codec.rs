//! Canonical protobuf JSON for generated message types.

use prost::Message;
use prost_reflect::{DeserializeOptions, DynamicMessage, ReflectMessage, SerializeOptions};
use serde::{de::Error as _, Deserializer, Serializer};

use crate::error::Error;

/// The two-method JSON capability every generated message implements.
pub trait JsonMessage {
    fn to_json(&self, marshaler: &JsonMarshaler) -> Result<Vec<u8>, Error>;

    /// Replaces the contents of `self` with the message encoded in `buf`.
    fn from_json(&mut self, unmarshaler: &JsonUnmarshaler, buf: &[u8]) -> Result<(), Error>;
}

/// Serialization settings for message → JSON.
#[derive(Debug, Clone)]
pub struct JsonMarshaler {
    options: SerializeOptions,
}

impl Default for JsonMarshaler {
    fn default() -> Self {
        JsonMarshaler::new(SerializeOptions::new())
    }
}

impl JsonMarshaler {
    pub fn new(options: SerializeOptions) -> Self {
        JsonMarshaler { options }
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    pub fn marshal<M: ReflectMessage>(&self, msg: &M) -> Result<Vec<u8>, Error> {
        let dynamic = msg.transcode_to_dynamic();
        let mut serializer = serde_json::Serializer::new(Vec::new());
        dynamic.serialize_with_options(&mut serializer, &self.options)?;
        Ok(serializer.into_inner())
    }
}

/// Deserialization settings for JSON → message.
#[derive(Debug, Clone)]
pub struct JsonUnmarshaler {
    options: DeserializeOptions,
}

impl Default for JsonUnmarshaler {
    fn default() -> Self {
        JsonUnmarshaler::new(DeserializeOptions::new())
    }
}

impl JsonUnmarshaler {
    pub fn new(options: DeserializeOptions) -> Self {
        JsonUnmarshaler { options }
    }

    pub fn options(&self) -> &DeserializeOptions {
        &self.options
    }

    /// Parses `buf` and overwrites `msg` with the result. `msg` is left
    /// untouched when parsing fails.
    pub fn unmarshal<M: ReflectMessage>(&self, buf: &[u8], msg: &mut M) -> Result<(), Error> {
        let mut deserializer = serde_json::Deserializer::from_slice(buf);
        let dynamic = DynamicMessage::deserialize_with_options(msg.descriptor(), &mut deserializer, &self.options)?;
        deserializer.end()?;

        msg.clear();
        msg.merge(dynamic.encode_to_vec().as_slice())?;
        Ok(())
    }
}

impl JsonMessage for DynamicMessage {
    fn to_json(&self, marshaler: &JsonMarshaler) -> Result<Vec<u8>, Error> {
        marshaler.marshal(self)
    }

    fn from_json(&mut self, unmarshaler: &JsonUnmarshaler, buf: &[u8]) -> Result<(), Error> {
        unmarshaler.unmarshal(buf, self)
    }
}

/// Well-known types used directly as a method's input or output get no
/// generated adapter. The scalar wrappers are plain Rust types in prost and
/// are not routed.
macro_rules! well_known_json_message {
    ($($ty:ident),* $(,)?) => {
        $(
            impl JsonMessage for ::prost_types::$ty {
                fn to_json(&self, marshaler: &JsonMarshaler) -> Result<Vec<u8>, Error> {
                    marshaler.marshal(self)
                }

                fn from_json(&mut self, unmarshaler: &JsonUnmarshaler, buf: &[u8]) -> Result<(), Error> {
                    unmarshaler.unmarshal(buf, self)
                }
            }
        )*
    };
}

well_known_json_message!(
    Any,
    Duration,
    FieldMask,
    ListValue,
    Struct,
    Timestamp,
    Value,
);

/// Marshals `msg`, writing the JSON `null` literal when there is no message.
pub fn marshal_optional<M: JsonMessage>(msg: Option<&M>, marshaler: &JsonMarshaler) -> Result<Vec<u8>, Error> {
    match msg {
        Some(msg) => msg.to_json(marshaler),
        None => Ok(b"null".to_vec()),
    }
}

/// `serde::Serialize` body of the generated adapters.
pub fn serialize<M, S>(msg: &M, serializer: S) -> Result<S::Ok, S::Error>
where
    M: ReflectMessage,
    S: Serializer,
{
    msg.transcode_to_dynamic()
        .serialize_with_options(serializer, JsonMarshaler::default().options())
}

/// `serde::Deserialize` body of the generated adapters.
pub fn deserialize<'de, M, D>(deserializer: D) -> Result<M, D::Error>
where
    M: ReflectMessage + Default,
    D: Deserializer<'de>,
{
    let descriptor = M::default().descriptor();
    let dynamic =
        DynamicMessage::deserialize_with_options(descriptor, deserializer, JsonUnmarshaler::default().options())?;
    dynamic.transcode_to::<M>().map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::greeting;
    use prost_reflect::Value;
    use serde_json::json;

    #[test]
    fn test_marshal_uses_canonical_mapping() {
        let mut msg = greeting();
        msg.set_field_by_name("name", Value::String("hi".to_owned()));
        msg.set_field_by_name("count", Value::I32(3));

        let buf = JsonMarshaler::default().marshal(&msg).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value, json!({"name": "hi", "count": 3}));
    }

    #[test]
    fn test_unmarshal_resets_the_receiver() {
        let mut msg = greeting();
        msg.set_field_by_name("loud", Value::Bool(true));

        JsonUnmarshaler::default()
            .unmarshal(br#"{"name": "x", "count": "7"}"#, &mut msg)
            .unwrap();
        assert_eq!(msg.get_field_by_name("name").unwrap().as_str(), Some("x"));
        assert_eq!(msg.get_field_by_name("count").unwrap().as_i32(), Some(7));
        assert_eq!(msg.get_field_by_name("loud").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn test_unmarshal_rejects_bad_json() {
        let mut msg = greeting();
        msg.set_field_by_name("name", Value::String("kept".to_owned()));

        let err = JsonUnmarshaler::default().unmarshal(b"{\"count\": true}", &mut msg);
        assert!(matches!(err, Err(Error::Json(_))));
        assert_eq!(msg.get_field_by_name("name").unwrap().as_str(), Some("kept"));

        assert!(JsonUnmarshaler::default().unmarshal(b"{} trailing", &mut msg).is_err());
    }

    #[test]
    fn test_marshal_optional_none_is_null() {
        let msg = greeting();
        let marshaler = JsonMarshaler::default();
        assert_eq!(marshal_optional::<DynamicMessage>(None, &marshaler).unwrap(), b"null");
        assert_eq!(marshal_optional(Some(&msg), &marshaler).unwrap(), b"{}");
    }

    #[test]
    fn test_well_known_types() {
        let ts = prost_types::Timestamp { seconds: 0, nanos: 0 };
        assert_eq!(ts.to_json(&JsonMarshaler::default()).unwrap(), br#""1970-01-01T00:00:00Z""#);

        let mut elapsed = prost_types::Duration::default();
        elapsed.from_json(&JsonUnmarshaler::default(), br#""1.5s""#).unwrap();
        assert_eq!(elapsed, prost_types::Duration { seconds: 1, nanos: 500_000_000 });
    }

    #[test]
    fn test_serialize_helper() {
        let mut msg = greeting();
        msg.set_field_by_name("ratio", Value::F64(0.5));
        let value = serialize(&msg, serde_json::value::Serializer).unwrap();
        assert_eq!(value, json!({"ratio": 0.5}));
    }
}
