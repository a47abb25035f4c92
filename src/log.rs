//! Structured log sink handed to each pipeline component.
//!
//! Components never call `tracing` directly; they receive a `&dyn LogSink`
//! so tests can capture the emitted events.

use std::fmt;

use tracing::{error, info};

pub type Field<'a> = (&'static str, &'a dyn fmt::Display);

pub trait LogSink {
    fn info(&self, event: &str, fields: &[Field<'_>]);
    fn error(&self, event: &str, fields: &[Field<'_>]);
}

/// Forwards events to the global `tracing` subscriber.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, event: &str, fields: &[Field<'_>]) {
        info!(event = event, fields = %FieldList(fields));
    }

    fn error(&self, event: &str, fields: &[Field<'_>]) {
        error!(event = event, fields = %FieldList(fields));
    }
}

/// Renders fields as `key=value` pairs separated by spaces.
struct FieldList<'a, 'b>(&'a [Field<'b>]);

impl fmt::Display for FieldList<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub use capture::{CaptureSink, Level};
