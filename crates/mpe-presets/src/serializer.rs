//! Plain-text settings format.
//!
//! Settings are stored INI-style under an `[mpeemulator]` section, one
//! `NAME = ratio` line per parameter that differs from its default:
//!
//! ```text
//! [mpeemulator]
//! Z1CHN = 0.285714285714286
//! Z1R1MP = 0.750
//! ```
//!
//! Reading is forgiving: blanks, `;` comments, unknown sections, unknown
//! names and malformed lines are skipped.

use mpe_engine::{
    ControlHandle, Engine, Message, MessageSink, ParamId, SharedState, PARAM_NAME_MAX_LEN,
};

/// Name of the section holding engine settings.
pub const SECTION_NAME: &str = "mpeemulator";

pub const LINE_END: &str = "\r\n";

/// Size limit of a settings file, and of a single line in it.
pub const MAX_SIZE: usize = 256 * 1024;

/// Section names are compared on this many characters.
const SECTION_NAME_MAX_LEN: usize = SECTION_NAME.len() + 1;

/// Parameters within this distance of their default are not written.
const DEFAULT_RATIO_TOLERANCE: f64 = 0.000001;

/// Writes every parameter whose published ratio differs from its default.
pub fn serialize(shared: &SharedState) -> String {
    let mut serialized = String::with_capacity(4096);
    serialized.push('[');
    serialized.push_str(SECTION_NAME);
    serialized.push(']');
    serialized.push_str(LINE_END);

    for id in ParamId::all() {
        let ratio = shared.param_ratio(id);
        let default_ratio = id.spec().default_ratio();
        if (default_ratio - ratio).abs() <= DEFAULT_RATIO_TOLERANCE {
            continue;
        }

        let mut number = format!("{:.15}", ratio);
        trim_trailing_zeros(&mut number);

        serialized.push_str(id.name());
        serialized.push_str(" = ");
        serialized.push_str(&number);
        serialized.push_str(LINE_END);
    }

    serialized
}

/// Drops trailing zeros after the decimal point, keeping one of them.
///
/// `"0.500000"` becomes `"0.50"`, `"0.000"` becomes `"0.0"`.
pub fn trim_trailing_zeros(number: &mut String) {
    let Some(dot) = number.find('.') else {
        return;
    };
    let fraction = &number[dot..];
    let significant = fraction.trim_end_matches('0').len();
    if significant < fraction.len() {
        number.truncate(dot + significant + 1);
    }
}

/// Applies settings from the audio thread.
///
/// Messages already queued by the GUI are applied first so they cannot
/// override the imported values later.
pub fn import_settings_in_audio_thread(engine: &mut Engine, serialized: &str) -> usize {
    engine.process_messages();
    import_settings(engine, serialized)
}

/// Queues settings for the audio thread to apply at its next block.
pub fn import_settings_in_gui_thread(handle: &mut ControlHandle, serialized: &str) -> usize {
    import_settings(handle, serialized)
}

/// Sends a `Clear` followed by one `SetParam` per recognized line.
///
/// Returns the number of parameters found.
pub fn import_settings<S: MessageSink + ?Sized>(sink: &mut S, serialized: &str) -> usize {
    let params = parse_settings(serialized);

    let mut dropped = usize::from(!sink.push_message(Message::clear()));
    for &(id, ratio) in &params {
        if !sink.push_message(Message::set_param(id, ratio)) {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, "settings import incomplete, message queue full");
    }
    tracing::debug!(params = params.len(), "settings imported");

    params.len()
}

/// Parameters set inside `[mpeemulator]` sections, in file order.
pub fn parse_settings(serialized: &str) -> Vec<(ParamId, f64)> {
    let mut params = Vec::new();
    let mut is_inside_section = false;

    for line in parse_lines(serialized) {
        if let Some(name) = parse_section_name(line) {
            is_inside_section = name == SECTION_NAME;
            continue;
        }
        if !is_inside_section {
            continue;
        }
        if let Some((name, ratio)) = parse_param_line(line) {
            if let Some(id) = ParamId::from_name(&name) {
                params.push((id, ratio));
            }
        }
    }

    params
}

/// Splits on `\r` and `\n`, dropping empty lines.
///
/// A line of `MAX_SIZE - 1` bytes or more is cut there.
pub fn parse_lines(serialized: &str) -> Vec<&str> {
    serialized
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .map(|line| truncate_line(line, MAX_SIZE - 1))
        .collect()
}

fn truncate_line(line: &str, max_len: usize) -> &str {
    if line.len() <= max_len {
        return line;
    }
    let mut end = max_len;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Name of the section a `[name]` header line opens.
///
/// Only the first few characters of the name are kept, enough to tell
/// `mpeemulator` apart from longer names.
pub fn parse_section_name(line: &str) -> Option<&str> {
    let mut cursor = Cursor::new(line);

    if cursor.skip_blanks_or_comment() || !cursor.eat(b'[') {
        return None;
    }
    cursor.skip_blanks();

    let start = cursor.pos;
    while cursor.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
        cursor.pos += 1;
    }
    let end = cursor.pos.min(start + SECTION_NAME_MAX_LEN);

    cursor.skip_blanks();
    if !cursor.eat(b']') || !cursor.skip_blanks_or_comment() {
        return None;
    }

    Some(&line[start..end])
}

#[inline]
pub fn is_section_start(line: &str) -> bool {
    parse_section_name(line) == Some(SECTION_NAME)
}

/// Whether the line holds nothing but blanks and maybe a comment.
pub fn is_blank_or_comment(line: &str) -> bool {
    Cursor::new(line).skip_blanks_or_comment()
}

/// Parses `NAME = number`, upper-casing the name and clamping the number
/// to `[0, 1]`.
pub fn parse_param_line(line: &str) -> Option<(String, f64)> {
    let mut cursor = Cursor::new(line);
    let name = cursor.param_name_until_value()?;

    if cursor.skip_blanks_or_comment() {
        return None;
    }
    let number = cursor.number()?;
    if !cursor.skip_blanks_or_comment() {
        return None;
    }

    Some((name, number))
}

/// Parses `NAME =` and returns the upper-cased name with everything after
/// the equal sign.
pub fn split_name_and_value(line: &str) -> Option<(String, &str)> {
    let mut cursor = Cursor::new(line);
    let name = cursor.param_name_until_value()?;
    Some((name, &line[cursor.pos..]))
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Returns whether only blanks or a comment were left.
    fn skip_blanks_or_comment(&mut self) -> bool {
        self.skip_blanks();
        if self.peek() == Some(b';') {
            self.pos = self.text.len();
        }
        self.is_at_end()
    }

    /// Names of `PARAM_NAME_MAX_LEN` characters or more are rejected, as
    /// are names running to the end of the line.
    fn param_name(&mut self) -> Option<String> {
        let mut name = String::with_capacity(PARAM_NAME_MAX_LEN);

        while let Some(c) = self.peek().filter(u8::is_ascii_alphanumeric) {
            name.push(char::from(c.to_ascii_uppercase()));
            self.pos += 1;

            if name.len() == PARAM_NAME_MAX_LEN || self.is_at_end() {
                return None;
            }
        }

        (!name.is_empty()).then_some(name)
    }

    fn param_name_until_value(&mut self) -> Option<String> {
        if self.skip_blanks_or_comment() {
            return None;
        }
        let name = self.param_name()?;
        if self.skip_blanks_or_comment() || !self.eat(b'=') {
            return None;
        }
        Some(name)
    }

    /// Digits with at most one dot.
    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut has_dot = false;

        while let Some(c) = self.peek() {
            if c == b'.' {
                if has_dot {
                    return None;
                }
                has_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.pos += 1;
        }

        let number: f64 = self.text[start..self.pos].parse().ok()?;
        Some(number.clamp(0.0, 1.0))
    }
}
