//! Grammar rules for parsing class diagrams.
//!
//! The diagram is line oriented. Lines are first split and numbered, then a
//! small statement-level state machine walks them, handing the pieces of
//! each statement to the combinators in [`crate::lexer`].

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use crudgen_core::{
    ast::*,
    ParseError,
};

use crate::lexer::*;

/// Statements that carry presentation only.
const SKIPPED_KEYWORDS: &[&str] = &[
    "direction", "note", "style", "classDef", "cssClass", "click", "link", "callback",
];

/// Parse a complete class diagram.
pub fn parse(input: &str) -> Result<ParsedDiagram, ParseError> {
    let lines = split_lines(input);
    let mut parser = Parser::new(&lines);
    parser.parse_diagram()
}

/// Index of a class record plus whether it was declared with a body.
#[derive(Debug, Clone, Copy)]
struct ClassSlot {
    index: usize,
    has_block: bool,
}

/// What a class body line turned into.
enum BodyEntry {
    Member(RawMember),
    Stereotype(String),
}

/// Stateful parser that tracks position in the line list.
struct Parser<'a> {
    lines: &'a [Line<'a>],
    pos: usize,
    items: Vec<DiagramItem>,
    classes: IndexMap<String, ClassSlot>,
    namespace_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(lines: &'a [Line<'a>]) -> Self {
        Self {
            lines,
            pos: 0,
            items: Vec::new(),
            classes: IndexMap::new(),
            namespace_depth: 0,
        }
    }

    /// Get current line, if any.
    fn current(&self) -> Option<&'a Line<'a>> {
        let lines: &'a [Line<'a>] = self.lines;
        lines.get(self.pos)
    }

    /// Advance to next line.
    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Parse the full diagram.
    fn parse_diagram(&mut self) -> Result<ParsedDiagram, ParseError> {
        while let Some(line) = self.current() {
            self.parse_statement(line)?;
        }
        self.check_literals()?;

        Ok(ParsedDiagram {
            items: std::mem::take(&mut self.items),
        })
    }

    /// Parse one top-level statement starting at the current line.
    fn parse_statement(&mut self, line: &'a Line<'a>) -> Result<(), ParseError> {
        let content = line.content;
        let line_num = line.line_number;
        let first_word = content.split_whitespace().next().unwrap_or_default();

        if first_word.starts_with("classDiagram") || SKIPPED_KEYWORDS.contains(&first_word) {
            debug!(line = line_num, statement = first_word, "skipping diagram statement");
            self.advance();
            return Ok(());
        }

        if content == "}" {
            if self.namespace_depth == 0 {
                return Err(ParseError::UnmatchedBrace { line: line_num });
            }
            self.namespace_depth -= 1;
            self.advance();
            return Ok(());
        }

        if let Ok((_, name)) = namespace_header(content) {
            debug!(line = line_num, namespace = name, "entering namespace");
            self.namespace_depth += 1;
            self.advance();
            return Ok(());
        }

        if first_word == "class" {
            return self.parse_class_block(line);
        }

        if first_word == "enum" {
            return self.parse_enum_block(line);
        }

        if let Ok((_, (stereo, name))) = stereotype_line(content) {
            let index = self.class_index(name, line_num);
            self.set_stereotype(index, stereo.to_string());
            self.advance();
            return Ok(());
        }

        if let Ok((_, parts)) = inheritance(content) {
            self.items.push(DiagramItem::Inheritance(RawInheritance {
                parent: parts.parent.to_string(),
                child: parts.child.to_string(),
                realization: parts.realization,
                span: Span::line(line_num),
            }));
            self.advance();
            return Ok(());
        }

        if let Ok((_, parts)) = relationship(content) {
            self.items.push(DiagramItem::Relationship(RawRelationship {
                source: parts.source.to_string(),
                target: parts.target.to_string(),
                source_multiplicity: parts.source_multiplicity.map(str::to_string),
                target_multiplicity: parts.target_multiplicity.map(str::to_string),
                arrow: parts.arrow,
                label: parts.label.map(str::to_string),
                span: Span::line(line_num),
            }));
            self.advance();
            return Ok(());
        }

        if looks_like_relationship(content) {
            return Err(ParseError::InvalidRelationship {
                line: line_num,
                reason: format!("cannot read endpoints of {:?}", content),
            });
        }

        if let Ok((_, (name, member))) = member_line(content) {
            let index = self.class_index(name, line_num);
            match parse_body_entry(member.trim(), line_num)? {
                Some(BodyEntry::Member(member)) => self.push_member(index, member),
                Some(BodyEntry::Stereotype(stereo)) => self.set_stereotype(index, stereo),
                None => {}
            }
            self.advance();
            return Ok(());
        }

        Err(ParseError::UnexpectedStatement {
            line: line_num,
            text: content.to_string(),
        })
    }

    /// Parse `class Name ...` with an optional body.
    fn parse_class_block(&mut self, line: &'a Line<'a>) -> Result<(), ParseError> {
        let line_num = line.line_number;
        let (_, header) = class_header(line.content).map_err(|_| ParseError::UnexpectedStatement {
            line: line_num,
            text: line.content.to_string(),
        })?;
        self.advance();

        let index = self.class_block_index(header.name, line_num, header.body.is_some());
        if let Some(stereo) = header.stereotype {
            self.set_stereotype(index, stereo.to_string());
        }

        let Some(first) = header.body else {
            return Ok(());
        };

        for (seg_line, segment) in self.collect_body(line_num, first)? {
            for text in segment.split(';') {
                match parse_body_entry(text.trim(), seg_line)? {
                    Some(BodyEntry::Member(member)) => self.push_member(index, member),
                    Some(BodyEntry::Stereotype(stereo)) => self.set_stereotype(index, stereo),
                    None => {}
                }
            }
        }
        Ok(())
    }

    /// Parse `enum Name { A, B }`.
    fn parse_enum_block(&mut self, line: &'a Line<'a>) -> Result<(), ParseError> {
        let line_num = line.line_number;
        let (_, (name, body)) = enum_header(line.content).map_err(|_| ParseError::UnexpectedStatement {
            line: line_num,
            text: line.content.to_string(),
        })?;
        self.advance();

        let mut literals = Vec::new();
        if let Some(first) = body {
            for (seg_line, segment) in self.collect_body(line_num, first)? {
                for text in segment.split([',', ';']) {
                    let text = text.trim();
                    if text.is_empty() || text.starts_with("<<") {
                        continue;
                    }
                    literals.push(parse_literal(text, seg_line)?);
                }
            }
        }

        self.items.push(DiagramItem::Enum(RawEnum {
            name: name.to_string(),
            literals,
            span: Span::line(line_num),
        }));
        Ok(())
    }

    /// Collect body text up to the closing brace.
    ///
    /// `first` is whatever followed `{` on the header line. Returns
    /// `(line, text)` segments with the braces removed.
    fn collect_body(
        &mut self,
        header_line: u32,
        first: &'a str,
    ) -> Result<Vec<(u32, &'a str)>, ParseError> {
        let mut segments = Vec::new();

        if close_segment(first, header_line, &mut segments)? {
            return Ok(segments);
        }

        while let Some(line) = self.current() {
            let content = line.content;
            let first_word = content.split_whitespace().next().unwrap_or_default();
            if matches!(first_word, "class" | "enum" | "namespace") {
                return Err(ParseError::UnterminatedBlock { line: header_line });
            }
            self.advance();
            if close_segment(content, line.line_number, &mut segments)? {
                return Ok(segments);
            }
        }

        Err(ParseError::UnterminatedBlock { line: header_line })
    }

    /// Find or create the record for a class mentioned outside a block.
    fn class_index(&mut self, name: &str, line: u32) -> usize {
        if let Some(slot) = self.classes.get(name) {
            return slot.index;
        }
        self.insert_class(name, line, false)
    }

    /// Find or create the record for a `class` statement.
    ///
    /// A second block for a class that already had one produces a second
    /// record so the duplicate is reported by the model builder.
    fn class_block_index(&mut self, name: &str, line: u32, with_block: bool) -> usize {
        match self.classes.get_mut(name) {
            Some(slot) if !(slot.has_block && with_block) => {
                slot.has_block |= with_block;
                slot.index
            }
            Some(_) => {
                self.items.push(DiagramItem::Class(RawClass::new(name, Span::line(line))));
                self.items.len() - 1
            }
            None => self.insert_class(name, line, with_block),
        }
    }

    fn insert_class(&mut self, name: &str, line: u32, has_block: bool) -> usize {
        self.items.push(DiagramItem::Class(RawClass::new(name, Span::line(line))));
        let index = self.items.len() - 1;
        self.classes.insert(name.to_string(), ClassSlot { index, has_block });
        index
    }

    fn push_member(&mut self, index: usize, member: RawMember) {
        if let DiagramItem::Class(class) = &mut self.items[index] {
            class.members.push(member);
        }
    }

    fn set_stereotype(&mut self, index: usize, stereo: String) {
        if let DiagramItem::Class(class) = &mut self.items[index] {
            class.stereotype = Some(stereo);
        }
    }

    /// Bare literals are only valid in enumeration classes, and fields are
    /// not valid there. Checked once the whole diagram is read since the
    /// stereotype may be declared after the members.
    fn check_literals(&self) -> Result<(), ParseError> {
        for class in self.items.iter().filter_map(|item| match item {
            DiagramItem::Class(class) => Some(class),
            _ => None,
        }) {
            let enumeration = class.is_enumeration();
            for member in &class.members {
                match member {
                    RawMember::Literal(lit) if !enumeration => {
                        return Err(ParseError::InvalidMember {
                            line: lit.span.line,
                            text: lit.name.clone(),
                        });
                    }
                    RawMember::Field(field) if enumeration => {
                        return Err(ParseError::InvalidMember {
                            line: field.span.line,
                            text: format!("{}: {}", field.name, field.type_ref),
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

/// Push the part of `text` before a closing brace. Returns true once the
/// block is closed.
fn close_segment<'a>(
    text: &'a str,
    line: u32,
    segments: &mut Vec<(u32, &'a str)>,
) -> Result<bool, ParseError> {
    match text.find('}') {
        Some(end) => {
            let after = text[end + 1..].trim();
            if !after.is_empty() {
                return Err(ParseError::UnexpectedStatement {
                    line,
                    text: after.to_string(),
                });
            }
            segments.push((line, &text[..end]));
            Ok(true)
        }
        None => {
            segments.push((line, text));
            Ok(false)
        }
    }
}

/// Parse one class member. Methods yield `None`.
fn parse_body_entry(text: &str, line: u32) -> Result<Option<BodyEntry>, ParseError> {
    if text.is_empty() {
        return Ok(None);
    }

    if let Ok(("", stereo)) = stereotype(text) {
        return Ok(Some(BodyEntry::Stereotype(stereo.to_string())));
    }

    if text.contains('(') {
        debug!(line, member = text, "skipping method member");
        return Ok(None);
    }

    let text = text.trim_end_matches(['$', '*']).trim_end();
    let (visibility, text) = match text.chars().next().and_then(Visibility::from_marker) {
        Some(vis) => (Some(vis), text[1..].trim_start()),
        None => (None, text),
    };

    if let Ok((_, parts)) = field_name_colon_type(text) {
        return Ok(Some(BodyEntry::Member(field_from_parts(
            parts,
            visibility,
            FieldSyntax::NameColonType,
            line,
        ))));
    }

    if let Ok((_, parts)) = field_type_then_name(text) {
        return Ok(Some(BodyEntry::Member(field_from_parts(
            parts,
            visibility,
            FieldSyntax::TypeThenName,
            line,
        ))));
    }

    if visibility.is_none() {
        if let Ok(literal) = parse_literal(text, line) {
            return Ok(Some(BodyEntry::Member(RawMember::Literal(literal))));
        }
    }

    Err(ParseError::InvalidMember {
        line,
        text: text.to_string(),
    })
}

fn field_from_parts(
    parts: FieldParts<'_>,
    visibility: Option<Visibility>,
    syntax: FieldSyntax,
    line: u32,
) -> RawMember {
    RawMember::Field(RawField {
        name: parts.name.to_string(),
        type_ref: parts.type_ref,
        visibility,
        modifiers: SmallVec::from_vec(parts.modifiers),
        syntax,
        span: Span::line(line),
    })
}

fn parse_literal(text: &str, line: u32) -> Result<RawLiteral, ParseError> {
    match identifier(text) {
        Ok(("", name)) => Ok(RawLiteral {
            name: name.to_string(),
            span: Span::line(line),
        }),
        _ => Err(ParseError::InvalidMember {
            line,
            text: text.to_string(),
        }),
    }
}
