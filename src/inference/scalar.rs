use crate::ir::Kind;

/// Classifies element text content.
///
/// Empty text stays `String`: an element without content tells us nothing.
pub fn classify(text: &str) -> Kind {
    let text = text.trim();
    if text.is_empty() {
        return Kind::String;
    }
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        return Kind::Bool;
    }
    if text.parse::<i64>().is_ok() {
        return Kind::Int;
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Kind::Float,
        _ => Kind::String,
    }
}
