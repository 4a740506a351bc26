//! XML-RPC envelope encoding and decoding for the OpenNebula API.
//!
//! Only the subset OpenNebula uses is supported: scalar parameters in
//! requests, and `[success, body, error_code, ...]` arrays or `<fault>`
//! structs in responses.

use crate::core::domain::error::{OneError, OneResult};
use crate::core::infrastructure::xml_document::XmlElement;
use quick_xml::escape::escape;

/// A request parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcParam<'a> {
    Str(&'a str),
    Int(i32),
}

/// A decoded response value.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Array(Vec<RpcValue>),
    Struct(Vec<(String, RpcValue)>),
}

impl RpcValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RpcValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RpcValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RpcValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn member(&self, key: &str) -> Option<&RpcValue> {
        match self {
            RpcValue::Struct(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Builds a `methodCall` document.
pub fn encode_call(method: &str, params: &[RpcParam<'_>]) -> String {
    let mut body = String::with_capacity(256);
    body.push_str("<?xml version=\"1.0\"?><methodCall><methodName>");
    body.push_str(&escape(method));
    body.push_str("</methodName><params>");
    for param in params {
        body.push_str("<param><value>");
        match param {
            RpcParam::Str(s) => {
                body.push_str("<string>");
                body.push_str(&escape(*s));
                body.push_str("</string>");
            }
            RpcParam::Int(i) => {
                body.push_str("<i4>");
                body.push_str(&i.to_string());
                body.push_str("</i4>");
            }
        }
        body.push_str("</value></param>");
    }
    body.push_str("</params></methodCall>");
    body
}

/// Decodes a `methodResponse` into its single return value.
///
/// A `<fault>` is reported as [`OneError::RemoteService`].
pub fn decode_response(xml: &str) -> OneResult<RpcValue> {
    let root = XmlElement::parse(xml)?;
    if root.name != "methodResponse" {
        return Err(OneError::Parse(format!(
            "Expected <methodResponse>, got <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = decode_value(fault.required_child("value")?)?;
        let code = value
            .member("faultCode")
            .and_then(RpcValue::as_int)
            .unwrap_or_default();
        let message = value
            .member("faultString")
            .and_then(RpcValue::as_str)
            .unwrap_or("unknown fault");
        return Err(OneError::RemoteService(format!(
            "XML-RPC fault {}: {}",
            code, message
        )));
    }

    let value = root
        .required_child("params")?
        .required_child("param")?
        .required_child("value")?;
    decode_value(value)
}

/// Unwraps OpenNebula's `[success, body, error_code]` convention and returns the body.
pub fn into_one_body(method: &str, value: RpcValue) -> OneResult<String> {
    let RpcValue::Array(mut items) = value else {
        return Err(OneError::Parse(format!(
            "{} returned a non-array response",
            method
        )));
    };
    if items.len() < 2 {
        return Err(OneError::Parse(format!(
            "{} returned {} values, expected at least 2",
            method,
            items.len()
        )));
    }

    let success = items[0].as_bool().ok_or_else(|| {
        OneError::Parse(format!("{} returned a non-boolean success flag", method))
    })?;
    let code = items.get(2).and_then(RpcValue::as_int).unwrap_or_default();
    let body = match items.swap_remove(1) {
        RpcValue::Str(s) => s,
        RpcValue::Int(i) => i.to_string(),
        other => {
            return Err(OneError::Parse(format!(
                "{} returned an unexpected body: {:?}",
                method, other
            )));
        }
    };

    if success {
        Ok(body)
    } else {
        Err(OneError::RemoteService(format!(
            "{} failed (code {}): {}",
            method, code, body
        )))
    }
}

fn decode_value(value: &XmlElement) -> OneResult<RpcValue> {
    // An untyped <value> is a string.
    let Some(typed) = value.children.first() else {
        return Ok(RpcValue::Str(value.text.clone()));
    };

    match typed.name.as_str() {
        "string" => Ok(RpcValue::Str(typed.text.clone())),
        "boolean" => match typed.text.trim() {
            "1" => Ok(RpcValue::Bool(true)),
            "0" => Ok(RpcValue::Bool(false)),
            other => Err(OneError::Parse(format!("Invalid boolean '{}'", other))),
        },
        "int" | "i4" | "i8" => typed
            .text
            .trim()
            .parse()
            .map(RpcValue::Int)
            .map_err(|e| OneError::Parse(format!("Invalid integer '{}': {}", typed.text, e))),
        "double" => typed
            .text
            .trim()
            .parse()
            .map(RpcValue::Double)
            .map_err(|e| OneError::Parse(format!("Invalid double '{}': {}", typed.text, e))),
        "array" => typed
            .required_child("data")?
            .children_named("value")
            .map(decode_value)
            .collect::<OneResult<Vec<_>>>()
            .map(RpcValue::Array),
        "struct" => typed
            .children_named("member")
            .map(|member| {
                let name = member.required_text("name")?.to_string();
                let value = decode_value(member.required_child("value")?)?;
                Ok((name, value))
            })
            .collect::<OneResult<Vec<_>>>()
            .map(RpcValue::Struct),
        other => Err(OneError::Parse(format!(
            "Unsupported XML-RPC type <{}>",
            other
        ))),
    }
}
