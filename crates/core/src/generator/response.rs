//! Extraction of generated text from the response shapes seen in the wild.

use serde_json::Value;

use super::GenerationError;

/// A known response layout and where its text lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `[{"generated_text": "..."}]` (hosted inference)
    GeneratedTextList,
    /// `{"choices": [{"message": {"content": "..."}}]}` (chat completion)
    ChatCompletion,
    /// `{"choices": [{"text": "..."}]}` (legacy completion)
    TextCompletion,
    /// `{"generated_text": "..."}`
    GeneratedTextObject,
}

impl ResponseShape {
    /// Shapes in the order they are tried.
    pub const PRIORITY: [ResponseShape; 4] = [
        ResponseShape::GeneratedTextList,
        ResponseShape::ChatCompletion,
        ResponseShape::TextCompletion,
        ResponseShape::GeneratedTextObject,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::GeneratedTextList => "generated_text_list",
            ResponseShape::ChatCompletion => "chat_completion",
            ResponseShape::TextCompletion => "text_completion",
            ResponseShape::GeneratedTextObject => "generated_text_object",
        }
    }

    /// Pull non-empty text out of `value` if it has this shape.
    pub fn extract<'a>(&self, value: &'a Value) -> Option<&'a str> {
        let text = match self {
            ResponseShape::GeneratedTextList => value.get(0)?.get("generated_text")?,
            ResponseShape::ChatCompletion => value.pointer("/choices/0/message/content")?,
            ResponseShape::TextCompletion => value.pointer("/choices/0/text")?,
            ResponseShape::GeneratedTextObject => value.get("generated_text")?,
        };
        text.as_str().filter(|s| !s.is_empty())
    }
}

/// Turn a status code and raw body into generated text.
///
/// The body is parsed once; every failure keeps `body` verbatim.
pub fn extract_text(status: u16, body: &str) -> Result<(String, ResponseShape), GenerationError> {
    if !(200..300).contains(&status) {
        return Err(GenerationError::Api {
            status,
            raw: body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| GenerationError::InvalidJson {
        message: e.to_string(),
        raw: body.to_string(),
    })?;

    ResponseShape::PRIORITY
        .iter()
        .find_map(|shape| shape.extract(&value).map(|text| (text.to_string(), *shape)))
        .ok_or_else(|| GenerationError::NoText {
            raw: body.to_string(),
        })
}
