//! Line grammar for allocator traces
//!
//! Two shapes are recognized:
//!
//! ```text
//! malloc(24) = 0x55555555a260
//! free(0x55555555a260 <no return ...>
//! ```
//!
//! The first is a call that returned, the second a call the traced program
//! never came back from. An optional numeric thread id followed by
//! whitespace may prefix either. Lines that don't start with a known
//! function name are ignored; known calls that don't decode are reported
//! and skipped.

use super::call::{Arg, Call, Event, Function};
use crate::error::TraceError;
use tracing::{debug, warn};

const NO_RETURN: &str = "<no return";

/// A whole trace held in memory.
///
/// [`Trace::events`] can be called any number of times; each call replays the
/// text from the first line.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    text: String,
}

impl Trace {
    pub fn new(text: impl Into<String>) -> Self {
        Trace { text: text.into() }
    }

    pub fn events(&self) -> Events<'_> {
        Events {
            lines: self.text.lines().enumerate(),
        }
    }
}

/// Lazy iterator over the decodable events of a [`Trace`]
pub struct Events<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl Iterator for Events<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        for (index, text) in self.lines.by_ref() {
            let line = index + 1;
            match parse_line(text, line) {
                Ok(Some(event)) => return Some(event),
                Ok(None) => debug!(line, "not an allocator call, skipping"),
                Err(e) => warn!("ignoring line: {}", e),
            }
        }
        None
    }
}

/// Decode one trace line.
///
/// `Ok(None)` means the line is not about a function we track.
pub fn parse_line(text: &str, line: usize) -> Result<Option<Event>, TraceError> {
    let text = strip_thread_id(text.trim());

    let Some(open) = text.find('(') else {
        return Ok(None);
    };
    let Some(function) = Function::from_name(&text[..open]) else {
        return Ok(None);
    };
    let body = &text[open + 1..];

    let (raw_args, raw_ret) = if let Some(split) = split_returned(body) {
        split
    } else if let Some(pos) = body.find(NO_RETURN) {
        (body[..pos].trim_end(), None)
    } else {
        return Err(TraceError::Malformed { line });
    };

    let args = if function == Function::Annotate {
        vec![Arg::Str(unquote(raw_args.trim()).to_string())]
    } else {
        split_args(raw_args)
    };
    let call = Call::decode(function, args, line)?;

    let ret = match raw_ret {
        None => None,
        Some(token) => match Arg::sanitize(token) {
            Arg::Int(n) => Some(n),
            Arg::Str(token) => {
                return Err(TraceError::BadReturn {
                    line,
                    function: function.name(),
                    token,
                })
            }
        },
    };

    Ok(Some(Event { line, call, ret }))
}

/// Drop a leading `1234 ` thread or process id.
fn strip_thread_id(text: &str) -> &str {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return text;
    }
    let rest = &text[digits..];
    if rest.starts_with(char::is_whitespace) {
        rest.trim_start()
    } else {
        text
    }
}

/// Split `args) = ret` on the last `)` that is followed by `=`.
fn split_returned(body: &str) -> Option<(&str, Option<&str>)> {
    let eq = body.rfind('=')?;
    let before = body[..eq].trim_end();
    let args = before.strip_suffix(')')?;
    if before.len() == body[..eq].len() {
        // ltrace always pads the `=` with at least one space
        return None;
    }
    let ret = body[eq + 1..].trim();
    if ret.is_empty() {
        return None;
    }
    Some((args, Some(ret)))
}

fn split_args(raw: &str) -> Vec<Arg> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(Arg::sanitize).collect()
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
