//! Line-oriented source text assembly.

/// Accumulates indented source lines.
pub(crate) struct SourceBuilder {
    lines: Vec<String>,
    indent: usize,
    unit: &'static str,
}

impl SourceBuilder {
    /// Builder indenting with `unit` per level.
    pub fn new(unit: &'static str) -> Self {
        Self {
            lines: Vec::new(),
            indent: 0,
            unit,
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", self.unit.repeat(self.indent), text));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    /// Write `text` and indent what follows.
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.indent += 1;
        self
    }

    /// Dedent and write `text`.
    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self.line(text)
    }

    pub fn indent(&mut self) -> &mut Self {
        self.indent += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

fn trim_blank(lines: &[String]) -> &[String] {
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    &lines[start..end]
}

/// Join non-empty sections with `gap` blank lines between them.
pub(crate) fn join_sections(sections: &[Vec<String>], gap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for section in sections {
        let section = trim_blank(section);
        if section.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.extend(std::iter::repeat(String::new()).take(gap));
        }
        out.extend(section.iter().cloned());
    }
    out
}

/// Final file text with a trailing newline.
pub(crate) fn to_text(lines: &[String]) -> String {
    let mut text = trim_blank(lines).join("\n");
    text.push('\n');
    text
}

/// Quote `text` as a string literal with the given quote character.
pub(crate) fn quoted(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    out
}
