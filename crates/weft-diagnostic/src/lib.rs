//! Diagnostic and error reporting for Weft.
//! Weft 的诊断和错误报告。
//!
//! Validation problems and selection errors are turned into [`Diagnostic`]s,
//! which this crate renders with ariadne.
//! 验证问题和选择错误会被转换为 [`Diagnostic`]，由本 crate 使用 ariadne 渲染。

mod codes;
mod diagnostic;

pub use codes::ErrorCode;
pub use diagnostic::{Diagnostic, DiagnosticKind, Label, Severity};

use ariadne::{Color, ColorGenerator, Config, Label as AriadneLabel, Report, ReportKind, Source};
use std::io;

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        Severity::Hint => ReportKind::Custom("Hint", Color::Cyan),
    }
}

fn build_report<'a>(
    filename: &'a str,
    diagnostic: &Diagnostic,
    color: bool,
) -> Report<'a, (&'a str, std::ops::Range<usize>)> {
    let mut colors = ColorGenerator::new();
    let mut report = Report::build(
        report_kind(diagnostic.severity),
        filename,
        diagnostic.span.offset(),
    )
    .with_config(Config::default().with_color(color))
    .with_message(&diagnostic.message);

    if let Some(code) = &diagnostic.code {
        report = report.with_code(code.as_str());
    }

    for label in &diagnostic.labels {
        let mut ariadne_label =
            AriadneLabel::new((filename, label.span.range())).with_message(&label.message);
        if color {
            ariadne_label = ariadne_label.with_color(colors.next());
        }
        report = report.with_label(ariadne_label);
    }

    for note in &diagnostic.notes {
        report = report.with_note(note);
    }

    if let Some(help) = &diagnostic.help {
        report = report.with_help(help);
    }

    report.finish()
}

/// Render a diagnostic to a plain (uncolored) string.
/// 将诊断信息渲染为无颜色的字符串。
pub fn render(source: &str, filename: &str, diagnostic: &Diagnostic) -> io::Result<String> {
    let mut out = Vec::new();
    build_report(filename, diagnostic, false).write((filename, Source::from(source)), &mut out)?;
    String::from_utf8(out).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Render a diagnostic to stderr.
/// 将诊断信息渲染到标准错误输出。
pub fn emit(source: &str, filename: &str, diagnostic: &Diagnostic) -> io::Result<()> {
    build_report(filename, diagnostic, true).eprint((filename, Source::from(source)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_common::Span;

    #[test]
    fn test_with_code_fills_help() {
        let diag = Diagnostic::error(DiagnosticKind::Selection, Span::DUMMY, "no type `Foo`")
            .with_code(ErrorCode::UnresolvedSelector);
        assert_eq!(diag.help.as_deref(), ErrorCode::UnresolvedSelector.suggestion());
    }

    #[test]
    fn test_explicit_help_wins() {
        let diag = Diagnostic::error(DiagnosticKind::Selection, Span::DUMMY, "msg")
            .with_help("custom")
            .with_code(ErrorCode::UninferableType);
        assert_eq!(diag.help.as_deref(), Some("custom"));
    }

    #[test]
    fn test_render_mentions_message_and_code() {
        let source = "let x: Int = \"hello\";";
        let diag = Diagnostic::error(
            DiagnosticKind::Validation,
            Span::from_usize(13, 20),
            "The type 'String' is not assignable to the type 'Int'.",
        )
        .with_code(ErrorCode::NotAssignable)
        .with_label(Label::new(Span::from_usize(13, 20), "this has type `String`"));

        let rendered = render(source, "main.weft", &diag).expect("render failed");
        assert!(rendered.contains("is not assignable"));
        assert!(rendered.contains("W0100"));
        assert!(rendered.contains("this has type `String`"));
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Hint).unwrap();
        assert_eq!(json, "\"hint\"");
        assert_eq!(Severity::Warning.to_level(), 2);
    }
}
