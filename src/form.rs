//! Decoded query strings and request bodies.
//!
//! A [`Form`] keeps fields in the order they first appeared. A field sent
//! more than once becomes a [`FormValue::List`].

use bytes::Bytes;
use serde_json::Value;

/// An uploaded file from a `multipart/form-data` body.
#[derive(Clone, Debug, PartialEq)]
pub struct FormFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// One decoded form field.
#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    Text(String),
    List(Vec<String>),
    File(FormFile),
    /// A JSON body value that is not a string or a list of strings.
    Json(Value),
}

impl FormValue {
    fn push_text(&mut self, value: String) {
        match self {
            Self::Text(first) => *self = Self::List(vec![std::mem::take(first), value]),
            Self::List(values) => values.push(value),
            // Files and JSON values are never merged; the later field wins.
            other => *other = Self::Text(value),
        }
    }
}

impl PartialEq<&str> for FormValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Self::Text(text) if text == other)
    }
}

/// Decoded name/value pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Form {
    fields: Vec<(String, FormValue)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `application/x-www-form-urlencoded` bytes (also used for query strings).
    pub fn from_urlencoded(input: &[u8]) -> Self {
        let mut form = Self::new();
        for (name, value) in url::form_urlencoded::parse(input) {
            form.append_text(name.into_owned(), value.into_owned());
        }
        form
    }

    /// Decodes a JSON object body. Anything else is rejected.
    pub fn from_json(input: &[u8]) -> Result<Self, serde_json::Error> {
        let object: serde_json::Map<String, Value> = serde_json::from_slice(input)?;
        let fields = object.into_iter()
            .map(|(name, value)| (name, json_value(value)))
            .collect();
        Ok(Self { fields })
    }

    /// Decodes a `multipart/form-data` body delimited by `boundary`.
    pub async fn from_multipart(body: Bytes, boundary: &str) -> Result<Self, multer::Error> {
        let stream = futures_util::stream::once(async move {
            Ok::<Bytes, std::convert::Infallible>(body)
        });
        let mut multipart = multer::Multipart::new(stream, boundary);
        let mut form = Self::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else { continue };
            if field.file_name().is_some() {
                let file = FormFile {
                    filename: field.file_name().map(str::to_owned),
                    content_type: field.content_type().map(ToString::to_string),
                    data: field.bytes().await?,
                };
                form.insert(name, FormValue::File(file));
            } else {
                let text = field.text().await?;
                form.append_text(name, text);
            }
        }
        Ok(form)
    }

    /// Adds a text value, turning repeated names into a list.
    pub fn append_text(&mut self, name: String, value: String) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.push_text(value),
            None => self.fields.push((name, FormValue::Text(value))),
        }
    }

    /// Sets `name`, replacing any previous value.
    pub fn insert(&mut self, name: String, value: FormValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The first text value of `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            FormValue::Text(text) => Some(text),
            FormValue::List(values) => values.first().map(String::as_str),
            _ => None,
        }
    }

    /// Every text value of `name`; empty if absent.
    pub fn list(&self, name: &str) -> Vec<&str> {
        match self.get(name) {
            Some(FormValue::Text(text)) => vec![text.as_str()],
            Some(FormValue::List(values)) => values.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn file(&self, name: &str) -> Option<&FormFile> {
        match self.get(name)? {
            FormValue::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

fn json_value(value: Value) -> FormValue {
    match value {
        Value::String(text) => FormValue::Text(text),
        Value::Array(items) if items.iter().all(Value::is_string) => FormValue::List(
            items.into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    _ => None,
                })
                .collect(),
        ),
        other => FormValue::Json(other),
    }
}
