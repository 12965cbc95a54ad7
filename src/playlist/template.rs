//! Tiny line template for playlist listings.
//!
//! Placeholders are written `{{name}}` and may be padded with spaces. The
//! available names are `index` (1-based), `entity`, `title` and
//! `relative_time`.

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_]+)\s*\}\}").expect("placeholder regex"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{{{0}}}}}")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Index,
    Entity,
    Title,
    RelativeTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
}

/// Values substituted for one rendered entry.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub index: usize,
    pub entity: &'a str,
    pub title: &'a str,
    pub relative_time: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_text(&mut segments, source, last, whole.start())?;

            let field = match name.as_str() {
                "index" => Field::Index,
                "entity" => Field::Entity,
                "title" => Field::Title,
                "relative_time" => Field::RelativeTime,
                other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
            };
            segments.push(Segment::Field(field));
            last = whole.end();
        }
        push_text(&mut segments, source, last, source.len())?;

        Ok(Self { segments })
    }

    pub fn render_into(&self, out: &mut String, ctx: &TemplateContext<'_>) {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(Field::Index) => out.push_str(&ctx.index.to_string()),
                Segment::Field(Field::Entity) => out.push_str(ctx.entity),
                Segment::Field(Field::Title) => out.push_str(ctx.title),
                Segment::Field(Field::RelativeTime) => out.push_str(ctx.relative_time),
            }
        }
    }

    pub fn render(&self, ctx: &TemplateContext<'_>) -> String {
        let mut out = String::new();
        self.render_into(&mut out, ctx);
        out
    }
}

fn push_text(
    segments: &mut Vec<Segment>,
    source: &str,
    start: usize,
    end: usize,
) -> Result<(), TemplateError> {
    let text = &source[start..end];
    if let Some(pos) = text.find("{{") {
        return Err(TemplateError::Unterminated(start + pos));
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
    Ok(())
}
