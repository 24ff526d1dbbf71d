//! Request payload extraction for settings forms.
//!
//! Handlers accept either a JSON object or an
//! `application/x-www-form-urlencoded` body. Form names follow the field path
//! convention used in validation errors (`links[0].url`, `tags[1].id`) and are
//! folded into nested JSON; empty values are dropped so they count as absent.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use serde_json::{Map, Value};

use crate::domain::Error;

/// Largest list index accepted in a form field name.
pub const MAX_FORM_INDEX: usize = 99;

const JSON: &str = "application/json";
const URLENCODED: &str = "application/x-www-form-urlencoded";

/// Submitted payload normalised to JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedForm(pub Value);

impl SubmittedForm {
    /// Borrow the decoded payload.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Take ownership of the decoded payload.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
enum BodyKind {
    Json,
    UrlEncoded,
    Unsupported,
}

fn body_kind(content_type: &str) -> BodyKind {
    if content_type == JSON || content_type.ends_with("+json") {
        BodyKind::Json
    } else if content_type == URLENCODED {
        BodyKind::UrlEncoded
    } else {
        BodyKind::Unsupported
    }
}

impl FromRequest for SubmittedForm {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let content_type = req.content_type().to_ascii_lowercase();
        let body = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let bytes = body
                .await
                .map_err(|err| Error::invalid_request(format!("unreadable request body: {err}")))?;
            if bytes.is_empty() {
                return Ok(Self(Value::Object(Map::new())));
            }
            match body_kind(&content_type) {
                BodyKind::Json => serde_json::from_slice(&bytes)
                    .map(Self)
                    .map_err(|err| Error::invalid_request(format!("malformed JSON body: {err}"))),
                BodyKind::UrlEncoded => Ok(Self(decode_form(&bytes))),
                BodyKind::Unsupported => Err(Error::invalid_request(format!(
                    "unsupported content type '{content_type}'; expected {JSON} or {URLENCODED}"
                ))),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Fold URL-encoded pairs into a JSON object.
///
/// Pairs with empty values or unparseable names are skipped; later pairs
/// overwrite earlier ones with the same name. Lists are compacted, so
/// `links[0]` and `links[5]` become a two-element list.
///
/// # Examples
/// ```
/// use account_settings::inbound::http::form::decode_form;
/// use serde_json::json;
///
/// let value = decode_form(b"id=u1&links%5B0%5D.url=https%3A%2F%2Fexample.com&bio=");
/// assert_eq!(
///     value,
///     json!({ "id": "u1", "links": [{ "url": "https://example.com" }] })
/// );
/// ```
pub fn decode_form(body: &[u8]) -> Value {
    let mut root = Value::Object(Map::new());
    for (name, value) in url::form_urlencoded::parse(body) {
        if value.is_empty() {
            continue;
        }
        if let Some(segments) = parse_name(&name) {
            insert(&mut root, &segments, Value::String(value.into_owned()));
        }
    }
    compact(&mut root);
    root
}

fn parse_name(name: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    for part in name.split('.') {
        let (key, mut rest) = part.split_once('[').unwrap_or((part, ""));
        if key.is_empty() {
            return None;
        }
        segments.push(Segment::Key(key.to_owned()));
        while !rest.is_empty() {
            let (index, tail) = rest.split_once(']')?;
            let index: usize = index.parse().ok()?;
            if index > MAX_FORM_INDEX {
                return None;
            }
            segments.push(Segment::Index(index));
            rest = match tail {
                "" => "",
                other => other.strip_prefix('[')?,
            };
        }
    }
    Some(segments)
}

fn insert(target: &mut Value, segments: &[Segment], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    match first {
        Segment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                insert(slot, rest, value);
            }
        }
        Segment::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= *index {
                    items.resize(index + 1, Value::Null);
                }
                if let Some(slot) = items.get_mut(*index) {
                    insert(slot, rest, value);
                }
            }
        }
    }
}

fn compact(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.retain(|item| !item.is_null());
            items.iter_mut().for_each(compact);
        }
        Value::Object(map) => map.values_mut().for_each(compact),
        _ => {}
    }
}
