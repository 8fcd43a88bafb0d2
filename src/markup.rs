use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));

/// A run of text inside one rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub strong: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Span {
            text: text.to_string(),
            strong: false,
        }
    }
}

/// Markdown-lite used by the message bubbles: `**bold**` becomes a strong
/// span and every newline starts a new line. Nothing else is interpreted or
/// escaped, so markup-looking text such as `<b>` is shown as typed.
pub fn render(text: &str) -> Vec<Vec<Span>> {
    text.split('\n').map(render_line).collect()
}

fn render_line(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::plain(&line[last..whole.start()]));
        }
        spans.push(Span {
            text: inner.as_str().to_string(),
            strong: true,
        });
        last = whole.end();
    }

    if last < line.len() || spans.is_empty() {
        spans.push(Span::plain(&line[last..]));
    }
    spans
}

/// Text content of rendered lines, joined back with newlines.
#[cfg(test)]
pub fn plain_text(lines: &[Vec<Span>]) -> String {
    lines
        .iter()
        .map(|line| line.iter().map(|s| s.text.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
