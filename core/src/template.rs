//! Path templates and parameter encoding.
//!
//! A template such as `account/:id/keys/:key` is split on `/`. Inside each
//! segment the first `:` opens a placeholder that runs to the end of the
//! segment. Substitution works on these parsed parts, so `:id` can never
//! match inside `:idx`. Substituted values are percent-encoded so each one
//! stays exactly one segment.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{ApiError, Result};

/// Flat key/value input accepted by every method call.
pub type Params = serde_json::Map<String, Value>;

/// Marker that opens a placeholder inside a path segment.
pub const PLACEHOLDER_MARKER: char = ':';

/// Characters escaped inside a substituted path segment: the WHATWG path set
/// plus the segment delimiters `/`, `\` and `%`.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Param(String),
}

/// A parsed URL path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Self {
        let mut parts = Vec::new();
        for (i, segment) in raw.split('/').enumerate() {
            if i > 0 {
                parts.push(Part::Literal("/".to_string()));
            }
            match segment.find(PLACEHOLDER_MARKER) {
                Some(pos) if pos + 1 < segment.len() => {
                    if pos > 0 {
                        parts.push(Part::Literal(segment[..pos].to_string()));
                    }
                    parts.push(Part::Param(segment[pos + 1..].to_string()));
                }
                _ if segment.is_empty() => {}
                _ => parts.push(Part::Literal(segment.to_string())),
            }
        }
        Self {
            raw: raw.to_string(),
            parts,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            Part::Param(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    /// Moves every key that names a placeholder out of `input`.
    ///
    /// Returns `(path_params, residual)`.
    pub fn split(&self, mut input: Params) -> (Params, Params) {
        let mut path = Params::new();
        for name in self.placeholders() {
            if let Some(value) = input.remove(name) {
                path.insert(name.to_string(), value);
            }
        }
        (path, input)
    }

    /// Substitutes placeholders from `params`. Placeholders without a
    /// matching key stay in the output literally.
    ///
    /// ## Errors
    ///
    /// `InvalidPathValue` if a value is `.` or `..`.
    pub fn resolve(&self, params: &Params) -> Result<String> {
        let mut out = String::with_capacity(self.raw.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Param(name) => match params.get(name) {
                    Some(value) => out.push_str(&segment_text(name, value)?),
                    None => {
                        out.push(PLACEHOLDER_MARKER);
                        out.push_str(name);
                    }
                },
            }
        }
        Ok(out)
    }
}

impl From<&str> for PathTemplate {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Text of a value as it appears in a URL: strings verbatim, everything else
/// as compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Percent-encoded form of `value` for use as one path segment.
fn segment_text(name: &str, value: &Value) -> Result<String> {
    let text = value_text(value);
    if text == "." || text == ".." {
        return Err(ApiError::InvalidPathValue {
            name: name.to_string(),
        });
    }
    Ok(utf8_percent_encode(&text, PATH_SEGMENT).to_string())
}

/// Encodes scalar params as `application/x-www-form-urlencoded`.
///
/// `null` values are dropped. Arrays and objects are rejected.
pub fn encode_form(params: &Params) -> Result<String> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => {
                return Err(ApiError::UnsupportedQueryValue { key: key.clone() })
            }
            scalar => {
                serializer.append_pair(key, &value_text(scalar));
            }
        }
    }
    Ok(serializer.finish())
}
