use super::{error::RuntimeError, Object};

pub trait ValueFormatter {
    fn format(&self, value: &Object) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &Object) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// Display forms, with errors tagged by their code.
pub struct BasicFormatter;

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Object) -> String {
        match value {
            Object::Error(error) => self.format_error(error),
            value => format!("{value}"),
        }
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("[{}] ERROR: {error}", error.code())
    }
}
