//! Single-pass JSON event stream for bounded-memory consumers.
//!
//! A response body is never held in memory. Bytes go one at a time into a
//! [`Scanner`], which turns them into structural events delivered to a
//! [`Handler`] in strict document order. Consumers keep only what they need
//! (a record table, a handful of fields) and can always tell where a value
//! sits through its [`Path`]: the key it belongs to and the key of the
//! innermost enclosing object.
//!
//! ```text
//! bytes ──▶ Scanner ──▶ Handler::key_value(path, raw)
//!                  └──▶ object/array start & end, document start & end
//! ```
//!
//! Field extraction is data, not code: a consumer describes what it keeps
//! with a static table of [`FieldRule`]s, each mapping a `(parent, key)` pair
//! onto a setter for its result record.

#![deny(unsafe_code)]

use heapless::String;

mod scanner;

pub use scanner::{MAX_DEPTH, ScanError, Scanner};

/// Positional context of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Path<'a> {
    /// Key the value (or container) is stored under. Values inside an array
    /// carry the array's key; empty at the document root.
    pub key: &'a str,
    /// Key of the innermost enclosing object, empty at the document root.
    pub parent: &'a str,
    /// Nesting depth of the event (the root container is depth 1).
    pub depth: usize,
}

impl<'a> Path<'a> {
    /// `Some(key)` unless the event has no key (document root).
    pub fn key(&self) -> Option<&'a str> {
        if self.key.is_empty() {
            None
        } else {
            Some(self.key)
        }
    }
}

/// Lexical class of a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Null,
}

/// A scalar exactly as it appeared in the stream (strings unescaped).
///
/// Conversions are lenient in the way device firmware expects: a number is
/// read from the leading numeric prefix and anything unparsable reads as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawValue<'a> {
    text: &'a str,
    kind: ValueKind,
}

impl<'a> RawValue<'a> {
    pub fn new(text: &'a str, kind: ValueKind) -> Self {
        Self { text, kind }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_null(&self) -> bool {
        self.kind == ValueKind::Null
    }

    /// Leading decimal number, `0.0` when there is none.
    pub fn to_f64(&self) -> f64 {
        float_prefix(self.text).parse().unwrap_or(0.0)
    }

    /// Leading decimal number, `0.0` when there is none.
    pub fn to_f32(&self) -> f32 {
        float_prefix(self.text).parse().unwrap_or(0.0)
    }

    /// Leading integer, `0` when there is none. Fractions are cut off.
    pub fn to_i32(&self) -> i32 {
        int_prefix(self.text).parse().unwrap_or(0)
    }

    /// `true` for the literal `true` and for any non-zero number
    /// (feeds encode flags both ways, e.g. `"dst":"1"`).
    pub fn to_bool(&self) -> bool {
        match self.text {
            "true" => true,
            "false" => false,
            _ => self.to_f64() != 0.0,
        }
    }
}

fn sign_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b'-') | Some(b'+') => 1,
        _ => 0,
    }
}

fn digits_from(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

fn int_prefix(text: &str) -> &str {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let sign = sign_len(bytes);
    let digits = digits_from(bytes, sign);
    if digits == 0 {
        return "";
    }
    &text[..sign + digits]
}

fn float_prefix(text: &str) -> &str {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = sign_len(bytes);
    let int_digits = digits_from(bytes, end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(bytes, end + 1);
        if frac_digits > 0 || int_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_start = end + 1;
        let exp_sign = sign_len(&bytes[exp_start..]);
        let exp_digits = digits_from(bytes, exp_start + exp_sign);
        if exp_digits > 0 {
            end = exp_start + exp_sign + exp_digits;
        }
    }
    &text[..end]
}

/// Receiver of structural events, called in document order.
///
/// Every callback but [`key_value`](Handler::key_value) has an empty default,
/// so a consumer only implements what it reacts to.
pub trait Handler {
    /// The first structural byte of a document was seen.
    fn document_start(&mut self) {}

    /// An object opened; `path.key` is the key it is stored under.
    fn object_start(&mut self, _path: &Path<'_>) {}

    /// The object opened with the same `path.key` closed.
    fn object_end(&mut self, _path: &Path<'_>) {}

    /// An array opened; its elements will arrive under `path.key`.
    fn array_start(&mut self, _path: &Path<'_>) {}

    /// The array stored under `path.key` closed.
    fn array_end(&mut self, _path: &Path<'_>) {}

    /// A scalar value stored under `path.key`.
    fn key_value(&mut self, path: &Path<'_>, value: RawValue<'_>);

    /// The root container closed, or the stream ended early.
    fn document_end(&mut self) {}
}

/// One entry of a static field-mapping table.
///
/// `parent` restricts the rule to values whose innermost enclosing object is
/// stored under that key: `None` matches anywhere, `Some("")` only at the
/// document root.
pub struct FieldRule<R> {
    pub parent: Option<&'static str>,
    pub key: &'static str,
    pub apply: fn(&mut R, &RawValue<'_>),
}

impl<R> core::fmt::Debug for FieldRule<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldRule")
            .field("parent", &self.parent)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<R> FieldRule<R> {
    pub fn matches(&self, path: &Path<'_>) -> bool {
        self.key == path.key && self.parent.is_none_or(|parent| parent == path.parent)
    }
}

/// Applies every rule of `rules` matching `path` to `record`.
///
/// Returns `true` when at least one rule matched.
pub fn apply_rules<R>(rules: &[FieldRule<R>], record: &mut R, path: &Path<'_>, value: &RawValue<'_>) -> bool {
    let mut matched = false;
    for rule in rules.iter().filter(|rule| rule.matches(path)) {
        (rule.apply)(record, value);
        matched = true;
    }
    matched
}

/// Replaces `dst` with as much of `src` as fits, cutting on a char boundary.
pub fn set_truncated<const N: usize>(dst: &mut String<N>, src: &str) {
    dst.clear();
    push_truncated(dst, src);
}

/// Appends as much of `src` as fits, cutting on a char boundary.
pub fn push_truncated<const N: usize>(dst: &mut String<N>, src: &str) {
    for c in src.chars() {
        if dst.push(c).is_err() {
            break;
        }
    }
}
