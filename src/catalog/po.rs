//! Reading and writing the gettext PO text format.
//!
//! The parser keeps everything a later `msgmerge` run would care about:
//! comments and flags verbatim, `msgctxt`, plural forms, and the obsolete
//! (`#~`) tail. Strings may span multiple quoted segments and lines; the
//! usual C escapes are decoded on parse and re-encoded on render.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::catalog::{Catalog, Entry};
use crate::fs;

/// Reads and parses a PO file.
pub fn load_file(path: &Path) -> Result<Catalog> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    parse(&source).with_context(|| format!("Failed to parse PO file: {}", path.display()))
}

/// Renders and atomically writes a catalog as a PO file.
pub fn write_file(catalog: &Catalog, path: &Path) -> Result<()> {
    fs::atomic_write(path, render(catalog))
}

/// Which keyword the current entry is accumulating string segments for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Context,
    Original,
    Plural,
    Translation(usize),
}

#[derive(Default)]
struct EntryBuilder {
    comments: Vec<String>,
    context: Option<String>,
    original: Option<String>,
    plural: Option<String>,
    translations: Vec<String>,
}

impl EntryBuilder {
    fn append(&mut self, section: Section, text: &str, lineno: usize) -> Result<()> {
        let target = match section {
            Section::None => bail!("line {lineno}: string continuation outside of an entry"),
            Section::Context => self.context.as_mut(),
            Section::Original => self.original.as_mut(),
            Section::Plural => self.plural.as_mut(),
            Section::Translation(n) => self.translations.get_mut(n),
        };
        match target {
            Some(target) => target.push_str(text),
            None => bail!("line {lineno}: string continuation outside of an entry"),
        }
        Ok(())
    }

    fn finish(self, catalog: &mut Catalog, lineno: usize) -> Result<()> {
        let Some(original) = self.original else {
            bail!("line {lineno}: entry without msgid");
        };

        let mut translations = self.translations.into_iter();
        let translation = translations.next().filter(|t| !t.is_empty());
        let entry = Entry {
            comments: self.comments,
            context: self.context,
            original,
            plural: self.plural,
            translation,
            plural_translations: translations.collect(),
        };

        if entry.original.is_empty() && entry.context.is_none() && entry.plural.is_none() {
            if catalog.header.is_some() {
                bail!("line {lineno}: duplicate header entry");
            }
            catalog.header = Some(entry);
        } else {
            catalog.entries.push(entry);
        }
        Ok(())
    }
}

/// Parses PO source text into a catalog.
pub fn parse(source: &str) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    let mut builder = EntryBuilder::default();
    let mut section = Section::None;

    for (index, raw) in source.lines().enumerate() {
        let lineno = index + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if matches!(section, Section::Context) {
                bail!("line {lineno}: msgctxt without msgid");
            }
            if builder.original.is_some() {
                std::mem::take(&mut builder).finish(&mut catalog, lineno)?;
            }
            section = Section::None;
            continue;
        }

        if trimmed.starts_with("#~") {
            if matches!(section, Section::Context | Section::Original | Section::Plural) {
                bail!("line {lineno}: obsolete marker inside entry");
            }
            if builder.original.is_some() {
                std::mem::take(&mut builder).finish(&mut catalog, lineno)?;
            }
            section = Section::None;
            catalog.obsolete.push(line.to_string());
            continue;
        }

        if trimmed.starts_with('#') {
            match section {
                Section::None => {}
                Section::Translation(_) => {
                    std::mem::take(&mut builder).finish(&mut catalog, lineno)?;
                    section = Section::None;
                }
                _ => bail!("line {lineno}: comment inside entry"),
            }
            builder.comments.push(line.to_string());
            continue;
        }

        if trimmed.starts_with('"') {
            let text = parse_string_parts(trimmed, lineno)?;
            builder.append(section, &text, lineno)?;
            continue;
        }

        let (keyword, rest) = split_keyword(trimmed);
        match keyword {
            "msgctxt" => {
                match section {
                    Section::None => {}
                    Section::Translation(_) => {
                        std::mem::take(&mut builder).finish(&mut catalog, lineno)?;
                    }
                    _ => bail!("line {lineno}: msgctxt must precede msgid"),
                }
                builder.context = Some(parse_string_parts(rest, lineno)?);
                section = Section::Context;
            }
            "msgid" => {
                match section {
                    Section::None | Section::Context => {}
                    Section::Translation(_) => {
                        std::mem::take(&mut builder).finish(&mut catalog, lineno)?;
                    }
                    _ => bail!("line {lineno}: duplicate msgid"),
                }
                builder.original = Some(parse_string_parts(rest, lineno)?);
                section = Section::Original;
            }
            "msgid_plural" => {
                if section != Section::Original {
                    bail!("line {lineno}: msgid_plural must follow msgid");
                }
                builder.plural = Some(parse_string_parts(rest, lineno)?);
                section = Section::Plural;
            }
            "msgstr" => {
                if matches!(section, Section::None | Section::Context) {
                    bail!("line {lineno}: msgstr without msgid");
                }
                if !builder.translations.is_empty() {
                    bail!("line {lineno}: duplicate msgstr");
                }
                builder.translations.push(parse_string_parts(rest, lineno)?);
                section = Section::Translation(0);
            }
            _ => {
                let Some(index) = parse_msgstr_index(keyword) else {
                    bail!("line {lineno}: unrecognized keyword: {keyword}");
                };
                if matches!(section, Section::None | Section::Context) {
                    bail!("line {lineno}: msgstr without msgid");
                }
                if index != builder.translations.len() {
                    bail!("line {lineno}: msgstr[{index}] out of order");
                }
                builder.translations.push(parse_string_parts(rest, lineno)?);
                section = Section::Translation(index);
            }
        }
    }

    let last_line = source.lines().count();
    if matches!(section, Section::Context) {
        bail!("line {last_line}: msgctxt without msgid");
    }
    if builder.original.is_some() {
        std::mem::take(&mut builder).finish(&mut catalog, last_line)?;
    } else {
        // Trailing detached comments have no entry to attach to; keep them
        // verbatim at the tail so nothing is dropped on rewrite.
        catalog.obsolete.extend(builder.comments);
    }

    Ok(catalog)
}

fn split_keyword(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '"')
        .unwrap_or(line.len());
    (&line[..end], &line[end..])
}

fn parse_msgstr_index(keyword: &str) -> Option<usize> {
    keyword
        .strip_prefix("msgstr[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Parses every quoted segment on `rest`, concatenating their decoded
/// contents. At least one segment must be present.
fn parse_string_parts(rest: &str, lineno: usize) -> Result<String> {
    let mut out = String::new();
    let mut rest = rest.trim_start();
    let mut found = false;

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('"') else {
            bail!("line {lineno}: expected quoted string");
        };
        let mut end = None;
        let mut escaped = false;
        for (i, c) in inner.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                end = Some(i);
                break;
            }
        }
        let Some(end) = end else {
            bail!("line {lineno}: unterminated string");
        };
        unescape_into(&mut out, &inner[..end], lineno)?;
        rest = inner[end + 1..].trim_start();
        found = true;
    }

    if !found {
        bail!("line {lineno}: expected quoted string");
    }
    Ok(out)
}

fn unescape_into(out: &mut String, s: &str, lineno: usize) -> Result<()> {
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => bail!("line {lineno}: unsupported escape: \\{other}"),
            None => bail!("line {lineno}: trailing backslash in string"),
        }
    }
    Ok(())
}

/// Renders a catalog back to PO source text.
pub fn render(catalog: &Catalog) -> String {
    let mut blocks = Vec::new();
    if let Some(header) = &catalog.header {
        blocks.push(render_entry(header));
    }
    for entry in &catalog.entries {
        blocks.push(render_entry(entry));
    }
    if !catalog.obsolete.is_empty() {
        let mut tail = catalog.obsolete.join("\n");
        tail.push('\n');
        blocks.push(tail);
    }
    blocks.join("\n")
}

fn render_entry(entry: &Entry) -> String {
    let mut out = String::new();
    for comment in &entry.comments {
        out.push_str(comment);
        out.push('\n');
    }
    if let Some(context) = &entry.context {
        render_field(&mut out, "msgctxt", context);
    }
    render_field(&mut out, "msgid", &entry.original);
    if let Some(plural) = &entry.plural {
        render_field(&mut out, "msgid_plural", plural);
        render_field(&mut out, "msgstr[0]", entry.translation.as_deref().unwrap_or(""));
        for (i, translation) in entry.plural_translations.iter().enumerate() {
            render_field(&mut out, &format!("msgstr[{}]", i + 1), translation);
        }
    } else {
        render_field(&mut out, "msgstr", entry.translation.as_deref().unwrap_or(""));
    }
    out
}

/// Writes `keyword "value"`, splitting multi-line values into one quoted
/// segment per line the way msgcat does.
fn render_field(out: &mut String, keyword: &str, value: &str) {
    if !value.contains('\n') {
        out.push_str(keyword);
        out.push_str(" \"");
        escape_into(out, value);
        out.push_str("\"\n");
        return;
    }

    out.push_str(keyword);
    out.push_str(" \"\"\n");
    let mut start = 0;
    for (i, c) in value.char_indices() {
        if c == '\n' {
            push_segment(out, &value[start..=i]);
            start = i + 1;
        }
    }
    if start < value.len() {
        push_segment(out, &value[start..]);
    }
}

fn push_segment(out: &mut String, segment: &str) {
    out.push('"');
    escape_into(out, segment);
    out.push_str("\"\n");
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
}
