//! Byte-at-a-time JSON scanner.
//!
//! The scanner keeps only the current token, the current key and a key per
//! open container, so its footprint is fixed by three const generics:
//!
//! - `K`: longest key kept (longer keys are cut)
//! - `V`: longest scalar kept (longer values are cut)
//! - `F`: number of container levels whose keys are remembered
//!
//! Container kinds are tracked in a bit stack up to [`MAX_DEPTH`] levels, so
//! the structure stays checked even past `F`; keys deeper than `F` read as
//! empty. Anything before the first `{` or `[` is skipped, which lets a
//! caller feed a response body without locating its exact start, and
//! anything after the root container closes is ignored.

use heapless::{String, Vec};

use super::{Handler, Path, RawValue, ValueKind, set_truncated};

/// Deepest nesting the bit stack can follow.
pub const MAX_DEPTH: usize = 64;

/// Malformed input. Once reported, the scanner stays failed until
/// [`Scanner::reset`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ScanError {
    /// A byte that cannot appear at this position.
    UnexpectedByte(u8),
    /// A `}` or `]` that does not match the open container.
    UnbalancedClose,
    /// A bare word other than `true`, `false` or `null`.
    InvalidLiteral,
    /// A backslash sequence that is not a JSON escape.
    InvalidEscape,
    /// Nesting deeper than [`MAX_DEPTH`].
    TooDeep,
    /// The stream ended inside the document.
    Truncated,
    /// The stream ended before any document started.
    Empty,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ScanError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ScanError::UnexpectedByte(b) => defmt::write!(f, "UnexpectedByte({=u8:#x})", b),
            ScanError::UnbalancedClose => defmt::write!(f, "UnbalancedClose"),
            ScanError::InvalidLiteral => defmt::write!(f, "InvalidLiteral"),
            ScanError::InvalidEscape => defmt::write!(f, "InvalidEscape"),
            ScanError::TooDeep => defmt::write!(f, "TooDeep"),
            ScanError::Truncated => defmt::write!(f, "Truncated"),
            ScanError::Empty => defmt::write!(f, "Empty"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Prolog,
    Value { allow_close: bool },
    Key { allow_close: bool },
    Colon,
    KeyString,
    ValueString,
    Literal,
    AfterValue,
    Done,
    Failed(ScanError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Backslash,
    Unicode { digits: u8, code: u16 },
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Push-style JSON scanner feeding a [`Handler`].
#[derive(Debug)]
pub struct Scanner<const K: usize = 32, const V: usize = 96, const F: usize = 8> {
    state: State,
    escape: Escape,
    depth: usize,
    objects: u64,
    keys: Vec<String<K>, F>,
    key: String<K>,
    token: String<V>,
}

impl<const K: usize, const V: usize, const F: usize> Default for Scanner<K, V, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize, const V: usize, const F: usize> Scanner<K, V, F> {
    pub fn new() -> Self {
        Self {
            state: State::Prolog,
            escape: Escape::None,
            depth: 0,
            objects: 0,
            keys: Vec::new(),
            key: String::new(),
            token: String::new(),
        }
    }

    /// Returns the scanner to its initial state for the next document.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// `true` once the root container has closed.
    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    /// Feeds every byte of `bytes`, stopping at the first error.
    pub fn feed_slice<H: Handler>(&mut self, bytes: &[u8], handler: &mut H) -> Result<(), ScanError> {
        for &byte in bytes {
            self.feed(byte, handler)?;
        }
        Ok(())
    }

    /// Feeds one byte, delivering any event it completes to `handler`.
    pub fn feed<H: Handler>(&mut self, byte: u8, handler: &mut H) -> Result<(), ScanError> {
        let result = self.step(byte, handler);
        if let Err(error) = result {
            self.state = State::Failed(error);
        }
        result
    }

    /// Signals the end of the byte stream.
    ///
    /// A document that started but did not close still gets its
    /// `document_end`, so consumers can settle on whatever they collected;
    /// the return value tells whether the document was complete.
    pub fn finish<H: Handler>(&mut self, handler: &mut H) -> Result<(), ScanError> {
        match self.state {
            State::Done => Ok(()),
            State::Prolog => Err(ScanError::Empty),
            State::Failed(error) => {
                handler.document_end();
                Err(error)
            }
            _ => {
                self.state = State::Failed(ScanError::Truncated);
                handler.document_end();
                Err(ScanError::Truncated)
            }
        }
    }

    fn step<H: Handler>(&mut self, byte: u8, handler: &mut H) -> Result<(), ScanError> {
        match self.state {
            State::Prolog => match byte {
                b'{' => {
                    handler.document_start();
                    self.open(true, handler)
                }
                b'[' => {
                    handler.document_start();
                    self.open(false, handler)
                }
                _ => Ok(()),
            },
            State::Done => Ok(()),
            State::Failed(error) => Err(error),
            State::Value { allow_close } => match byte {
                b if is_whitespace(b) => Ok(()),
                b'"' => {
                    self.token.clear();
                    self.state = State::ValueString;
                    Ok(())
                }
                b'{' => self.open(true, handler),
                b'[' => self.open(false, handler),
                b']' if allow_close => self.close(false, handler),
                b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                    self.token.clear();
                    let _ = self.token.push(byte as char);
                    self.state = State::Literal;
                    Ok(())
                }
                _ => Err(ScanError::UnexpectedByte(byte)),
            },
            State::Key { allow_close } => match byte {
                b if is_whitespace(b) => Ok(()),
                b'"' => {
                    self.token.clear();
                    self.state = State::KeyString;
                    Ok(())
                }
                b'}' if allow_close => self.close(true, handler),
                _ => Err(ScanError::UnexpectedByte(byte)),
            },
            State::Colon => match byte {
                b if is_whitespace(b) => Ok(()),
                b':' => {
                    self.state = State::Value { allow_close: false };
                    Ok(())
                }
                _ => Err(ScanError::UnexpectedByte(byte)),
            },
            State::KeyString | State::ValueString => self.string_byte(byte, handler),
            State::Literal => match byte {
                b',' | b'}' | b']' => {
                    self.emit_literal(handler)?;
                    self.after_value(byte, handler)
                }
                b if is_whitespace(b) => {
                    self.emit_literal(handler)?;
                    self.state = State::AfterValue;
                    Ok(())
                }
                b'0'..=b'9' | b'a'..=b'z' | b'E' | b'.' | b'+' | b'-' => {
                    let _ = self.token.push(byte as char);
                    Ok(())
                }
                _ => Err(ScanError::UnexpectedByte(byte)),
            },
            State::AfterValue => self.after_value(byte, handler),
        }
    }

    fn after_value<H: Handler>(&mut self, byte: u8, handler: &mut H) -> Result<(), ScanError> {
        match byte {
            b if is_whitespace(b) => Ok(()),
            b',' => {
                self.state = if self.top_is_object() {
                    State::Key { allow_close: false }
                } else {
                    State::Value { allow_close: false }
                };
                Ok(())
            }
            b'}' => self.close(true, handler),
            b']' => self.close(false, handler),
            _ => Err(ScanError::UnexpectedByte(byte)),
        }
    }

    fn string_byte<H: Handler>(&mut self, byte: u8, handler: &mut H) -> Result<(), ScanError> {
        match self.escape {
            Escape::None => match byte {
                b'"' => self.end_string(handler),
                b'\\' => {
                    self.escape = Escape::Backslash;
                    Ok(())
                }
                // UTF-8 lead byte: one placeholder per non-ASCII char.
                0xC0..=0xFF => {
                    let _ = self.token.push('?');
                    Ok(())
                }
                // UTF-8 continuation byte.
                0x80..=0xBF => Ok(()),
                _ => {
                    let _ = self.token.push(byte as char);
                    Ok(())
                }
            },
            Escape::Backslash => {
                let c = match byte {
                    b'"' => '"',
                    b'\\' => '\\',
                    b'/' => '/',
                    b'b' => '\x08',
                    b'f' => '\x0c',
                    b'n' => '\n',
                    b'r' => '\r',
                    b't' => '\t',
                    b'u' => {
                        self.escape = Escape::Unicode { digits: 0, code: 0 };
                        return Ok(());
                    }
                    _ => return Err(ScanError::InvalidEscape),
                };
                self.escape = Escape::None;
                let _ = self.token.push(c);
                Ok(())
            }
            Escape::Unicode { digits, code } => {
                let nibble = (byte as char).to_digit(16).ok_or(ScanError::InvalidEscape)?;
                let code = (code << 4) | nibble as u16;
                if digits == 3 {
                    self.escape = Escape::None;
                    let c = if code < 0x80 { code as u8 as char } else { '?' };
                    let _ = self.token.push(c);
                } else {
                    self.escape = Escape::Unicode {
                        digits: digits + 1,
                        code,
                    };
                }
                Ok(())
            }
        }
    }

    fn end_string<H: Handler>(&mut self, handler: &mut H) -> Result<(), ScanError> {
        if self.state == State::KeyString {
            set_truncated(&mut self.key, &self.token);
            self.state = State::Colon;
        } else {
            self.emit(ValueKind::String, handler);
            self.state = State::AfterValue;
        }
        Ok(())
    }

    fn emit_literal<H: Handler>(&mut self, handler: &mut H) -> Result<(), ScanError> {
        let kind = match self.token.as_str() {
            "true" | "false" => ValueKind::Bool,
            "null" => ValueKind::Null,
            text if text.starts_with(['t', 'f', 'n']) => return Err(ScanError::InvalidLiteral),
            _ => ValueKind::Number,
        };
        self.emit(kind, handler);
        Ok(())
    }

    fn emit<H: Handler>(&self, kind: ValueKind, handler: &mut H) {
        let path = Path {
            key: &self.key,
            parent: self.parent(),
            depth: self.depth,
        };
        handler.key_value(&path, RawValue::new(&self.token, kind));
    }

    fn open<H: Handler>(&mut self, object: bool, handler: &mut H) -> Result<(), ScanError> {
        if self.depth >= MAX_DEPTH {
            return Err(ScanError::TooDeep);
        }

        // Inside an object this is the key just read; inside an array it is
        // the array's own key, so nested containers inherit it.
        let container_key = self.key.clone();
        {
            let path = Path {
                key: &container_key,
                parent: self.parent(),
                depth: self.depth + 1,
            };
            if object {
                handler.object_start(&path);
            } else {
                handler.array_start(&path);
            }
        }

        if object {
            self.objects |= 1 << self.depth;
        } else {
            self.objects &= !(1 << self.depth);
        }
        self.depth += 1;
        // Levels past F keep no key.
        let _ = self.keys.push(container_key);

        if object {
            self.key.clear();
            self.state = State::Key { allow_close: true };
        } else {
            self.state = State::Value { allow_close: true };
        }
        Ok(())
    }

    fn close<H: Handler>(&mut self, object: bool, handler: &mut H) -> Result<(), ScanError> {
        if self.depth == 0 || self.top_is_object() != object {
            return Err(ScanError::UnbalancedClose);
        }

        let depth = self.depth;
        if depth <= F {
            if let Some(key) = self.keys.pop() {
                self.key = key;
            }
        } else {
            self.key.clear();
        }
        self.depth -= 1;

        {
            let path = Path {
                key: &self.key,
                parent: self.parent(),
                depth,
            };
            if object {
                handler.object_end(&path);
            } else {
                handler.array_end(&path);
            }
        }

        if self.depth == 0 {
            self.state = State::Done;
            handler.document_end();
        } else {
            self.state = State::AfterValue;
        }
        Ok(())
    }

    fn top_is_object(&self) -> bool {
        self.depth > 0 && self.objects & (1 << (self.depth - 1)) != 0
    }

    /// Key of the innermost open object.
    fn parent(&self) -> &str {
        (0..self.depth)
            .rev()
            .find(|level| self.objects & (1 << level) != 0)
            .and_then(|level| self.keys.get(level))
            .map(|key| key.as_str())
            .unwrap_or("")
    }
}
