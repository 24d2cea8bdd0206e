//! Form decoding.
//!
//! Query and `application/x-www-form-urlencoded` body parameters are collected
//! into a JSON object (values starting with `{` that parse as JSON become
//! nested objects) and then assigned onto a message with weak typing: field
//! names match loosely, strings are coerced into numbers, booleans and enums,
//! and a single value fills a repeated field.

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::{request::Parts, Method};
use prost::Message;
use prost_reflect::{DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor, ReflectMessage, Value};
use serde_json::{Map, Value as JsonValue};
use url::form_urlencoded;

use crate::error::Error;

const WELL_KNOWN_PACKAGE: &str = "google.protobuf";

/// Decodes the request's form parameters into `msg`, replacing its contents.
pub fn decode<M: ReflectMessage>(parts: &Parts, body: &[u8], msg: &mut M) -> Result<(), Error> {
    let values = parse(&parts.method, parts.uri.query(), body);
    let decoded = weak_decode(&msg.descriptor(), &values)?;

    msg.clear();
    msg.merge(decoded.encode_to_vec().as_slice())?;
    Ok(())
}

/// Collects form parameters. Body parameters are read for POST, PUT and
/// PATCH only and take precedence over the query string; for a repeated key
/// the first value wins.
pub fn parse(method: &Method, query: Option<&str>, body: &[u8]) -> Map<String, JsonValue> {
    let mut pairs = Vec::new();
    if *method == Method::POST || *method == Method::PUT || *method == Method::PATCH {
        pairs.extend(form_urlencoded::parse(body).into_owned());
    }
    if let Some(query) = query {
        pairs.extend(form_urlencoded::parse(query.as_bytes()).into_owned());
    }

    let mut values = Map::new();
    for (key, value) in pairs {
        if !values.contains_key(&key) {
            values.insert(key, form_value(value));
        }
    }
    values
}

fn form_value(value: String) -> JsonValue {
    if value.starts_with('{') {
        if let Ok(object @ JsonValue::Object(_)) = serde_json::from_str::<JsonValue>(&value) {
            return object;
        }
    }
    JsonValue::String(value)
}

/// Builds a message of type `desc` from `values`. Keys naming no field are
/// ignored.
pub fn weak_decode(desc: &MessageDescriptor, values: &Map<String, JsonValue>) -> Result<DynamicMessage, Error> {
    let mut msg = DynamicMessage::new(desc.clone());
    for (key, value) in values {
        let Some(field) = find_field(desc, key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        let value = coerce_field(&field, value)?;
        msg.try_set_field(&field, value)
            .map_err(|err| Error::Form(format!("cannot decode '{}': {}", field.name(), err)))?;
    }
    Ok(msg)
}

fn find_field(desc: &MessageDescriptor, key: &str) -> Option<FieldDescriptor> {
    desc.get_field_by_name(key)
        .or_else(|| desc.get_field_by_json_name(key))
        .or_else(|| {
            desc.fields()
                .find(|field| field.name().eq_ignore_ascii_case(key) || field.json_name().eq_ignore_ascii_case(key))
        })
        .or_else(|| {
            let folded = fold(key);
            desc.fields().find(|field| fold(field.name()) == folded)
        })
}

fn fold(name: &str) -> String {
    name.chars().filter(|c| *c != '_').map(|c| c.to_ascii_lowercase()).collect()
}

fn coerce_field(field: &FieldDescriptor, value: &JsonValue) -> Result<Value, Error> {
    if field.is_map() {
        return coerce_map(field, value);
    }

    let kind = field.kind();
    if field.is_list() {
        let items = match value {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| coerce(field.name(), &kind, item))
                .collect::<Result<Vec<_>, _>>()?,
            single => vec![coerce(field.name(), &kind, single)?],
        };
        return Ok(Value::List(items));
    }

    coerce(field.name(), &kind, value)
}

fn coerce_map(field: &FieldDescriptor, value: &JsonValue) -> Result<Value, Error> {
    let Kind::Message(entry) = field.kind() else {
        return Err(invalid(field.name(), "expected a map entry"));
    };
    let JsonValue::Object(object) = value else {
        return Err(invalid(field.name(), "expected an object"));
    };

    let key_kind = entry.map_entry_key_field().kind();
    let value_kind = entry.map_entry_value_field().kind();

    let mut map = HashMap::with_capacity(object.len());
    for (key, item) in object {
        let key = map_key(field.name(), &key_kind, key)?;
        map.insert(key, coerce(field.name(), &value_kind, item)?);
    }
    Ok(Value::Map(map))
}

fn map_key(name: &str, kind: &Kind, key: &str) -> Result<MapKey, Error> {
    let key = JsonValue::String(key.to_owned());
    Ok(match kind {
        Kind::String => MapKey::String(text(&key)),
        Kind::Bool => MapKey::Bool(boolean(name, &key)?),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => MapKey::I32(number(name, &key)?),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => MapKey::I64(number(name, &key)?),
        Kind::Uint32 | Kind::Fixed32 => MapKey::U32(number(name, &key)?),
        Kind::Uint64 | Kind::Fixed64 => MapKey::U64(number(name, &key)?),
        _ => return Err(invalid(name, "unsupported map key type")),
    })
}

fn coerce(name: &str, kind: &Kind, value: &JsonValue) -> Result<Value, Error> {
    Ok(match kind {
        Kind::Bool => Value::Bool(boolean(name, value)?),
        Kind::String => Value::String(text(value)),
        Kind::Bytes => Value::Bytes(text(value).into_bytes().into()),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(number(name, value)?),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(number(name, value)?),
        Kind::Uint32 | Kind::Fixed32 => Value::U32(number(name, value)?),
        Kind::Uint64 | Kind::Fixed64 => Value::U64(number(name, value)?),
        Kind::Float => Value::F32(number(name, value)?),
        Kind::Double => Value::F64(number(name, value)?),
        Kind::Enum(desc) => {
            let tag = match value {
                JsonValue::String(label) => match desc.get_value_by_name(label) {
                    Some(known) => known.number(),
                    None => number(name, value)?,
                },
                other => number(name, other)?,
            };
            Value::EnumNumber(tag)
        }
        Kind::Message(desc) if desc.package_name() == WELL_KNOWN_PACKAGE => {
            Value::Message(DynamicMessage::deserialize(desc.clone(), value.clone())?)
        }
        Kind::Message(desc) => match value {
            JsonValue::Object(object) => Value::Message(weak_decode(desc, object)?),
            _ => return Err(invalid(name, "expected an object")),
        },
    })
}

fn text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(true) => "1".to_owned(),
        JsonValue::Bool(false) => "0".to_owned(),
        other => other.to_string(),
    }
}

fn boolean(name: &str, value: &JsonValue) -> Result<bool, Error> {
    match value {
        JsonValue::Null => Ok(false),
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(n) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        JsonValue::String(s) => match s.as_str() {
            "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            _ => Err(invalid(name, &format!("cannot parse '{}' as bool", s))),
        },
        _ => Err(invalid(name, "expected a bool")),
    }
}

fn number<T: FromStr>(name: &str, value: &JsonValue) -> Result<T, Error> {
    let repr = match value {
        JsonValue::Null => "0".to_owned(),
        JsonValue::Bool(b) => (if *b { "1" } else { "0" }).to_owned(),
        JsonValue::String(s) if s.is_empty() => "0".to_owned(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        _ => return Err(invalid(name, "expected a number")),
    };

    repr.parse::<T>()
        .or_else(|_| match value {
            // 1.5 assigned to an integer field truncates to 1
            JsonValue::Number(n) => n
                .as_f64()
                .map(|f| format!("{}", f.trunc()))
                .ok_or(())
                .and_then(|truncated| truncated.parse::<T>().map_err(|_| ())),
            _ => Err(()),
        })
        .map_err(|_| invalid(name, &format!("cannot parse '{}' as a number", repr)))
}

fn invalid(name: &str, detail: &str) -> Error {
    Error::Form(format!("cannot decode '{}': {}", name, detail))
}
