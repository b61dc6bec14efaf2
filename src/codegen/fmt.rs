//! Canonical layout for the emitted Go declarations.
//!
//! Understands the subset `Codegen` produces: one `type` declaration whose
//! body holds field lines, nested `struct {` openers and `}` closers, each
//! optionally followed by a raw-string tag. Output uses tab indentation and
//! gofmt-style column alignment of names and types.
use crate::error::FormatError;
use crate::ident::{is_digit, is_letter};

const SCALAR_TYPES: &[&str] = &["string", "bool", "int64", "float64", "interface{}"];

#[derive(Debug)]
enum Line<'a> {
    Decl { name: &'a str, ty: &'a str, opens: bool },
    Field { depth: usize, name: &'a str, ty: &'a str, tag: Option<&'a str> },
    Open { depth: usize, name: &'a str, ty: &'a str },
    Close { depth: usize, tag: Option<&'a str> },
}

pub fn format_source(src: &str) -> Result<String, FormatError> {
    let lines = parse(src)?;
    Ok(layout(&lines))
}

// ------------------------------- Parse ------------------------------------ //

fn parse(src: &str) -> Result<Vec<Line<'_>>, FormatError> {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut last_no = 0usize;

    for (idx, raw) in src.lines().enumerate() {
        let no = idx + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        last_no = no;

        if lines.is_empty() {
            let line = parse_decl(text, no)?;
            if let Line::Decl { opens: true, .. } = line {
                depth = 1;
            }
            lines.push(line);
            continue;
        }
        if depth == 0 {
            return Err(FormatError::new(no, "unexpected content after declaration"));
        }

        if let Some(rest) = text.strip_prefix('}') {
            depth -= 1;
            let tag = parse_tag(rest.trim(), no)?;
            lines.push(Line::Close { depth, tag });
            continue;
        }

        let (name, rest) = split_word(text);
        check_ident(name, no)?;
        if let Some(head) = rest.strip_suffix('{') {
            let ty = head.trim();
            check_struct_type(ty, no)?;
            lines.push(Line::Open { depth, name, ty });
            depth += 1;
        } else {
            let (ty, rest) = split_word(rest);
            check_scalar_type(ty, no)?;
            let tag = parse_tag(rest, no)?;
            lines.push(Line::Field { depth, name, ty, tag });
        }
    }

    if lines.is_empty() {
        return Err(FormatError::new(1, "empty source"));
    }
    if depth != 0 {
        return Err(FormatError::new(last_no, "unclosed struct"));
    }
    Ok(lines)
}

fn parse_decl(text: &str, no: usize) -> Result<Line<'_>, FormatError> {
    let rest = text
        .strip_prefix("type ")
        .ok_or_else(|| FormatError::new(no, "expected type declaration"))?;
    let (name, rest) = split_word(rest.trim_start());
    check_ident(name, no)?;
    match rest.strip_suffix('{') {
        Some(head) => {
            let ty = head.trim();
            check_struct_type(ty, no)?;
            Ok(Line::Decl { name, ty, opens: true })
        }
        None => {
            check_scalar_type(rest, no)?;
            Ok(Line::Decl { name, ty: rest, opens: false })
        }
    }
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn check_ident(name: &str, no: usize) -> Result<(), FormatError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if is_letter(c) || c == '_')
        && chars.all(|c| is_letter(c) || is_digit(c) || c == '_');
    if valid {
        Ok(())
    } else {
        Err(FormatError::new(no, format!("invalid identifier `{name}`")))
    }
}

fn base_type(ty: &str) -> &str {
    let mut base = ty;
    while let Some(rest) = base.strip_prefix("[]") {
        base = rest;
    }
    base
}

fn check_scalar_type(ty: &str, no: usize) -> Result<(), FormatError> {
    if SCALAR_TYPES.contains(&base_type(ty)) {
        Ok(())
    } else {
        Err(FormatError::new(no, format!("unknown type `{ty}`")))
    }
}

fn check_struct_type(ty: &str, no: usize) -> Result<(), FormatError> {
    if base_type(ty) == "struct" {
        Ok(())
    } else {
        Err(FormatError::new(no, format!("expected struct type, found `{ty}`")))
    }
}

fn parse_tag(text: &str, no: usize) -> Result<Option<&str>, FormatError> {
    if text.is_empty() {
        return Ok(None);
    }
    let inner = text
        .strip_prefix('`')
        .and_then(|t| t.strip_suffix('`'))
        .ok_or_else(|| FormatError::new(no, format!("malformed tag `{text}`")))?;
    if inner.contains('`') {
        return Err(FormatError::new(no, "backtick inside tag"));
    }
    Ok(Some(text))
}

// ------------------------------- Layout ----------------------------------- //

fn layout(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < lines.len() {
        match &lines[i] {
            Line::Decl { name, ty, opens } => {
                out.push_str(&format!("type {name} {ty}"));
                out.push_str(if *opens { " {\n" } else { "\n" });
                i += 1;
            }
            Line::Close { depth, tag } => {
                out.push_str(&"\t".repeat(*depth));
                out.push('}');
                if let Some(tag) = tag {
                    out.push(' ');
                    out.push_str(tag);
                }
                out.push('\n');
                i += 1;
            }
            Line::Field { depth, .. } | Line::Open { depth, .. } => {
                let end = field_run_end(lines, i, *depth);
                layout_run(&lines[i..end], *depth, &mut out);
                i = end;
            }
        }
    }
    out
}

fn field_depth(line: &Line<'_>) -> Option<usize> {
    match line {
        Line::Field { depth, .. } | Line::Open { depth, .. } => Some(*depth),
        _ => None,
    }
}

/// End of the run of consecutive fields at `depth` starting at `start`.
/// An opener always ends its run since the next line is nested.
fn field_run_end(lines: &[Line<'_>], start: usize, depth: usize) -> usize {
    let mut end = start;
    while end < lines.len() && field_depth(&lines[end]) == Some(depth) {
        let opener = matches!(lines[end], Line::Open { .. });
        end += 1;
        if opener {
            break;
        }
    }
    end
}

fn layout_run(run: &[Line<'_>], depth: usize, out: &mut String) {
    let indent = "\t".repeat(depth);
    let name_width = run
        .iter()
        .map(|line| match line {
            Line::Field { name, .. } | Line::Open { name, .. } => name.chars().count(),
            _ => 0,
        })
        .max()
        .unwrap_or(0);

    let mut i = 0;
    while i < run.len() {
        // types align across consecutive tagged fields
        let mut end = i;
        while end < run.len() && matches!(run[end], Line::Field { tag: Some(_), .. }) {
            end += 1;
        }
        let type_width = run[i..end]
            .iter()
            .map(|line| match line {
                Line::Field { ty, .. } => ty.chars().count(),
                _ => 0,
            })
            .max()
            .unwrap_or(0);

        for line in &run[i..end.max(i + 1)] {
            out.push_str(&indent);
            match line {
                Line::Field { name, ty, tag: Some(tag), .. } => {
                    out.push_str(&format!("{name:<name_width$} {ty:<type_width$} {tag}"));
                }
                Line::Field { name, ty, tag: None, .. } => {
                    out.push_str(&format!("{name:<name_width$} {ty}"));
                }
                Line::Open { name, ty, .. } => {
                    out.push_str(&format!("{name:<name_width$} {ty} {{"));
                }
                _ => {}
            }
            out.push('\n');
        }
        i = end.max(i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_names_and_types() {
        let raw = "type _ struct {\n\
            \tDoc struct {\n\
            \t\tID string `xml:\"id,attr\"`\n\
            \t\tCount []int64 `xml:\"count\"`\n\
            \t\tAuthorName string `xml:\"author-name\"`\n\
            \t\tTags struct {\n\
            \t\t\tTag []string `xml:\"tag\"`\n\
            \t\t} `xml:\"tags\"`\n\
            \t} `xml:\"doc\"`\n\
            }\n";
        let expected = "type _ struct {\n\
            \tDoc struct {\n\
            \t\tID         string  `xml:\"id,attr\"`\n\
            \t\tCount      []int64 `xml:\"count\"`\n\
            \t\tAuthorName string  `xml:\"author-name\"`\n\
            \t\tTags       struct {\n\
            \t\t\tTag []string `xml:\"tag\"`\n\
            \t\t} `xml:\"tags\"`\n\
            \t} `xml:\"doc\"`\n\
            }\n";
        assert_eq!(format_source(raw).unwrap(), expected);
    }

    #[test]
    fn reindents_and_collapses_spacing() {
        let raw = "type   _ struct {\n  A    string `xml:\"a\"`\n\n   }\n";
        assert_eq!(format_source(raw).unwrap(), "type _ struct {\n\tA string `xml:\"a\"`\n}\n");
    }

    #[test]
    fn sections_restart_after_nested_struct() {
        let raw = "type _ struct {\nLong struct {\nX string `xml:\"x\"`\n} `xml:\"long\"`\nB string `xml:\"b\"`\nCc string `xml:\"cc\"`\n}\n";
        let expected = "type _ struct {\n\
            \tLong struct {\n\
            \t\tX string `xml:\"x\"`\n\
            \t} `xml:\"long\"`\n\
            \tB  string `xml:\"b\"`\n\
            \tCc string `xml:\"cc\"`\n\
            }\n";
        assert_eq!(format_source(raw).unwrap(), expected);
    }

    #[test]
    fn reports_errors_with_line_numbers() {
        assert_eq!(format_source("").unwrap_err().line, 1);
        assert_eq!(format_source("struct {\n}").unwrap_err().line, 1);
        let unclosed = format_source("type _ struct {\n\tA string `xml:\"a\"`\n").unwrap_err();
        assert_eq!(unclosed, FormatError::new(2, "unclosed struct"));
        let extra = format_source("type _ struct {\n}\n}\n").unwrap_err();
        assert_eq!(extra.line, 3);
        let bad_tag = format_source("type _ struct {\n\tA string `xml:\"a\"\n}\n").unwrap_err();
        assert_eq!(bad_tag.line, 2);
        let bad_ident = format_source("type _ struct {\n\t9A string\n}\n").unwrap_err();
        assert_eq!(bad_ident.message, "invalid identifier `9A`");
        let superscript = format_source("type _ struct {\n\tA\u{b2} string\n}\n").unwrap_err();
        assert_eq!(superscript.line, 2);
        assert!(format_source("type _ struct {\n\t\u{c9}t\u{e9}\u{661} string\n}\n").is_ok());
    }
}
