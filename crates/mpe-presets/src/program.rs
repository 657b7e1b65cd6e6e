//! A named, serialized engine setting.

use crate::serializer::{
    is_section_start, parse_lines, parse_section_name, split_name_and_value, LINE_END,
    SECTION_NAME,
};
use std::iter::Peekable;

/// Longest program name kept intact.
pub const NAME_MAX_LEN: usize = 23;

/// Longest short name kept intact.
pub const SHORT_NAME_MAX_LEN: usize = 7;

const NAME_KEY: &str = "NAME";

/// A preset: a display name plus the settings lines it carries.
///
/// Lines other than `NAME` are kept verbatim, comments included, so that
/// importing and serializing a program does not lose anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    name: String,
    short_name: String,
    default_name: String,
    body: Vec<String>,
    serialized: String,
}

impl Program {
    /// Creates a program from serialized settings, then names it `name`
    /// (or `default_name` when `name` sanitizes to nothing).
    pub fn new(name: &str, default_name: &str, serialized: &str) -> Self {
        let mut program = Self {
            default_name: sanitize_name(default_name),
            ..Self::default()
        };
        program.import_without_update(serialized);
        program.set_name_without_update(name);
        program.update();
        program
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn set_name(&mut self, new_name: &str) {
        self.set_name_without_update(new_name);
        self.update();
    }

    /// A program with no settings lines.
    pub fn is_blank(&self) -> bool {
        self.body.is_empty()
    }

    /// Settings lines, in the order they were imported.
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.body.iter().map(String::as_str)
    }

    /// The program as an `[mpeemulator]` section.
    pub fn serialize(&self) -> &str {
        &self.serialized
    }

    /// Replaces the program with the first `[mpeemulator]` section of
    /// `serialized`.
    pub fn import(&mut self, serialized: &str) {
        self.import_without_update(serialized);
        self.update();
    }

    /// Reads one section from `lines`, stopping before the next section
    /// header.
    ///
    /// Without a section left in `lines`, the program becomes blank and
    /// takes its default name. A section without a `NAME` line keeps the
    /// current name.
    pub(crate) fn import_lines<'a, I>(&mut self, lines: &mut Peekable<I>, names_only: bool)
    where
        I: Iterator<Item = &'a str>,
    {
        self.read_section(lines);
        if names_only {
            self.body.clear();
        }
        self.update();
    }

    fn import_without_update(&mut self, serialized: &str) {
        let lines = parse_lines(serialized);
        self.read_section(&mut lines.into_iter().peekable());
    }

    fn read_section<'a, I>(&mut self, lines: &mut Peekable<I>)
    where
        I: Iterator<Item = &'a str>,
    {
        self.body.clear();

        if !lines.any(is_section_start) {
            self.name = self.default_name.clone();
            return;
        }

        while let Some(line) = lines.next_if(|line| parse_section_name(line).is_none()) {
            match split_name_and_value(line) {
                Some((key, value)) if key == NAME_KEY => self.set_name_without_update(value),
                _ => self.body.push(line.to_string()),
            }
        }
    }

    fn set_name_without_update(&mut self, new_name: &str) {
        let name = sanitize_name(new_name);
        self.name = if name.is_empty() {
            self.default_name.clone()
        } else {
            name
        };
    }

    fn update(&mut self) {
        self.short_name = truncate(&self.name, SHORT_NAME_MAX_LEN);

        self.serialized.clear();
        self.serialized.push('[');
        self.serialized.push_str(SECTION_NAME);
        self.serialized.push(']');
        self.serialized.push_str(LINE_END);
        self.serialized.push_str(NAME_KEY);
        self.serialized.push_str(" = ");
        self.serialized.push_str(&self.name);
        self.serialized.push_str(LINE_END);

        for line in &self.body {
            self.serialized.push_str(line);
            self.serialized.push_str(LINE_END);
        }
    }
}

#[inline]
fn is_allowed_char(c: char) -> bool {
    (' '..='~').contains(&c) && !matches!(c, '[' | ']' | '\\')
}

/// Keeps printable ASCII other than brackets and backslash, trims, and
/// shortens the result to `NAME_MAX_LEN`.
pub fn sanitize_name(name: &str) -> String {
    let allowed: String = name.chars().filter(|&c| is_allowed_char(c)).collect();
    truncate(allowed.trim(), NAME_MAX_LEN)
}

/// Shortens `text` to `max_len` characters as its head, `..` and its last
/// character.
///
/// `text` must be ASCII.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let head = max_len.saturating_sub(3);
    let mut truncated = String::with_capacity(max_len);
    truncated.push_str(&text[..head]);
    truncated.push_str("..");
    truncated.push_str(&text[text.len() - 1..]);
    truncated
}
