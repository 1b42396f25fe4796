use swc_common::{SourceMap, Span};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{messages:}")]
    JsParseError { messages: String },
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{message:}")]
    JsGenerateError { message: String },
}

pub fn code_frame(span: Span, message: &str, cm: &SourceMap) -> String {
    if span.is_dummy() {
        return message.to_string();
    }
    let loc = cm.lookup_char_pos(span.lo);
    format!("{} ({}:{})", message, loc.line, loc.col.0 + 1)
}
