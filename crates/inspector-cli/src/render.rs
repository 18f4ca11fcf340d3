//! Text rendering of command results

use ariadne::{Color, Label, Report, ReportKind, Source};
use inspector_ast::Span;
use inspector_command::{CommandResult, ErrorKind, ErrorReport, InspectorCommand, Payload};
use std::ops::Range;

/// Human-readable form of `result`
pub fn render_text(result: &CommandResult<InspectorCommand>) -> String {
    match result.payload() {
        Payload::Value { value } => value.to_string(),
        Payload::Error(report) => render_error(&result.command().query, report),
    }
}

fn title(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Compile => "Compile error",
        ErrorKind::Runtime => "Runtime error",
    }
}

/// Error report, pointing into the query when a span is known
pub fn render_error(query: &str, report: &ErrorReport) -> String {
    let Some(span) = report.span else {
        return format!("{}: {}", title(report.kind), report.message);
    };

    let range = char_range(query, span);
    let mut output = Vec::new();
    let written = Report::build(ReportKind::Error, (), range.start)
        .with_message(title(report.kind))
        .with_label(
            Label::new(range)
                .with_message(&report.message)
                .with_color(Color::Red),
        )
        .finish()
        .write(Source::from(query.to_string()), &mut output);

    match written {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => format!("{}: {}", title(report.kind), report.message),
    }
}

/// Byte span as the char range ariadne labels expect
fn char_range(query: &str, span: Span) -> Range<usize> {
    let chars_before = |byte: usize| query.char_indices().take_while(|(i, _)| *i < byte).count();
    chars_before(span.start)..chars_before(span.end)
}
