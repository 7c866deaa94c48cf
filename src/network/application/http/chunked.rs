//! `Transfer-Encoding: chunked` body decoding.

use crate::network::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Hex digits of the next chunk size.
    Size { len: usize, digits: u8 },
    /// Chunk extension, skipped up to the end of the size line.
    Extension { len: usize },
    /// CR seen after the size.
    SizeLf { len: usize },
    Data { remaining: usize },
    DataCr,
    DataLf,
    /// Last chunk seen. Trailers are ignored.
    Done,
}

/// Strips chunk framing from a response body as it arrives.
///
/// The decoder keeps its position across calls, so chunk boundaries and
/// read boundaries can fall anywhere relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDecoder {
    state: State,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Size { len: 0, digits: 0 },
        }
    }

    /// `true` once the zero-size last chunk was read.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Feeds one framed byte. Returns it when it is body data.
    pub fn decode(&mut self, byte: u8) -> Result<Option<u8>, Error> {
        self.state = match self.state {
            State::Size { len, digits } => match hex_digit(byte) {
                Some(digit) => {
                    let len = len
                        .checked_mul(16)
                        .and_then(|len| len.checked_add(digit))
                        .ok_or(Error::ProtocolError)?;
                    State::Size {
                        len,
                        digits: digits.saturating_add(1),
                    }
                }
                None if digits == 0 => return Err(Error::ProtocolError),
                None => match byte {
                    b';' | b' ' | b'\t' => State::Extension { len },
                    b'\r' => State::SizeLf { len },
                    b'\n' => after_size(len),
                    _ => return Err(Error::ProtocolError),
                },
            },
            State::Extension { len } if byte == b'\n' => after_size(len),
            State::Extension { len } => State::Extension { len },
            State::SizeLf { len } if byte == b'\n' => after_size(len),
            State::SizeLf { .. } => return Err(Error::ProtocolError),
            State::Data { remaining } => {
                self.state = if remaining > 1 {
                    State::Data {
                        remaining: remaining - 1,
                    }
                } else {
                    State::DataCr
                };
                return Ok(Some(byte));
            }
            State::DataCr => match byte {
                b'\r' => State::DataLf,
                b'\n' => State::Size { len: 0, digits: 0 },
                _ => return Err(Error::ProtocolError),
            },
            State::DataLf if byte == b'\n' => State::Size { len: 0, digits: 0 },
            State::DataLf => return Err(Error::ProtocolError),
            State::Done => State::Done,
        };
        Ok(None)
    }

    /// Decodes `buf` in place and returns the number of body bytes now at
    /// its front.
    pub fn decode_in_place(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut len = 0;
        for i in 0..buf.len() {
            if let Some(byte) = self.decode(buf[i])? {
                buf[len] = byte;
                len += 1;
            }
        }
        Ok(len)
    }
}

fn after_size(len: usize) -> State {
    if len == 0 {
        State::Done
    } else {
        State::Data { remaining: len }
    }
}

fn hex_digit(byte: u8) -> Option<usize> {
    match byte {
        b'0'..=b'9' => Some(usize::from(byte - b'0')),
        b'a'..=b'f' => Some(usize::from(byte - b'a' + 10)),
        b'A'..=b'F' => Some(usize::from(byte - b'A' + 10)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(framed: &[u8], split: usize) -> Result<std::vec::Vec<u8>, Error> {
        let mut decoder = ChunkDecoder::new();
        let mut body = std::vec::Vec::new();
        for part in framed.chunks(split) {
            let mut buf = part.to_vec();
            let n = decoder.decode_in_place(&mut buf)?;
            body.extend_from_slice(&buf[..n]);
        }
        assert!(decoder.is_done());
        Ok(body)
    }

    #[test]
    fn test_frames_are_stripped_at_any_split() {
        let framed = b"4\r\n{\"a\"\r\nA;name=value\r\n:[10,2,3]}\r\n0\r\nExpires: never\r\n\r\n";
        for split in 1..=framed.len() {
            assert_eq!(decode_all(framed, split).as_deref(), Ok(br#"{"a":[10,2,3]}"#.as_slice()));
        }
    }

    #[test]
    fn test_bare_line_feeds_are_accepted() {
        assert_eq!(decode_all(b"2\n{}\n0\n\n", 3).as_deref(), Ok(b"{}".as_slice()));
    }

    #[test]
    fn test_bad_framing_is_rejected() {
        let mut decoder = ChunkDecoder::new();
        assert_eq!(decoder.decode_in_place(&mut *b"zz\r\n".to_vec()), Err(Error::ProtocolError));

        let mut decoder = ChunkDecoder::new();
        assert_eq!(decoder.decode_in_place(&mut *b"2\r\n{}x".to_vec()), Err(Error::ProtocolError));

        let mut decoder = ChunkDecoder::new();
        let overflow = [b'f'; 32];
        assert_eq!(decoder.decode_in_place(&mut overflow.clone()), Err(Error::ProtocolError));
    }
}
