//! Rendering of a finished run's `ExecutionState`.
//!
//! The engine returns state as a value; these reporters are the only place
//! it is turned into text.

use std::io::{self, Write};

use clap::ValueEnum;
use engine::ExecutionState;

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One line per node.
    Text,
    /// Pretty-printed JSON object keyed by node id.
    Json,
}

impl Format {
    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            Self::Text => Box::new(TextReporter),
            Self::Json => Box::new(JsonReporter),
        }
    }
}

/// A consumer that renders execution state.
pub trait Reporter {
    fn render(&self, state: &ExecutionState, out: &mut dyn Write) -> io::Result<()>;
}

/// `id: input=X output=Y dependencies=[..]`, in execution order.
pub struct TextReporter;

impl Reporter for TextReporter {
    fn render(&self, state: &ExecutionState, out: &mut dyn Write) -> io::Result<()> {
        for (id, record) in state.iter() {
            writeln!(
                out,
                "{id}: input={} output={} dependencies=[{}]",
                record.input,
                record.output,
                record.dependencies.join(", ")
            )?;
        }
        Ok(())
    }
}

/// The state serialised as JSON, keys in execution order.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, state: &ExecutionState, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, state)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ExecutionRecord;

    fn sample_state() -> ExecutionState {
        let mut state = ExecutionState::new();
        state
            .insert("fetchUser", ExecutionRecord { input: 0, output: 1001, dependencies: vec![] })
            .unwrap();
        state
            .insert(
                "calcDiscount",
                ExecutionRecord { input: 1001, output: 2001, dependencies: vec!["fetchUser".into()] },
            )
            .unwrap();
        state
    }

    fn render(format: Format) -> String {
        let mut buf = Vec::new();
        format.reporter().render(&sample_state(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_lists_nodes_in_execution_order() {
        assert_eq!(
            render(Format::Text),
            "fetchUser: input=0 output=1001 dependencies=[]\n\
             calcDiscount: input=1001 output=2001 dependencies=[fetchUser]\n"
        );
    }

    #[test]
    fn json_is_an_ordered_object() {
        let out = render(Format::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["calcDiscount"]["output"], 2001);
        assert_eq!(value["calcDiscount"]["dependencies"][0], "fetchUser");
        assert!(out.find("fetchUser\": {").unwrap() < out.find("calcDiscount\": {").unwrap());
    }

    #[test]
    fn empty_state_renders_nothing_as_text() {
        let mut buf = Vec::new();
        TextReporter.render(&ExecutionState::new(), &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
