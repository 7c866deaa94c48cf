#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use libatmoscan::network::{Available, Close, Connect, Connection, Link, Read, Write};
use libatmoscan::system::Delay;

/// Canned server reply.
#[derive(Clone, Debug, Default)]
pub struct Reply {
    pub bytes: Vec<u8>,
    /// Bytes reported available per `available()` call.
    pub chunk: Option<usize>,
    /// Nothing more becomes available after this many bytes.
    pub stall_after: Option<usize>,
}

impl Reply {
    pub fn ok_json(body: &str) -> Self {
        Self::raw(&format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}",
            body
        ))
    }

    /// `200 OK` with `body` sent as one chunk per part.
    pub fn ok_json_in_chunks(parts: &[&str]) -> Self {
        let mut text = String::from("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\n");
        for part in parts {
            text.push_str(&format!("{:x}\r\n{}\r\n", part.len(), part));
        }
        text.push_str("0\r\n\r\n");
        Self::raw(&text)
    }

    pub fn raw(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
            ..Self::default()
        }
    }

    pub fn chunked(mut self, chunk: usize) -> Self {
        self.chunk = Some(chunk);
        self
    }

    pub fn stalling_after(mut self, bytes: usize) -> Self {
        self.stall_after = Some(bytes);
        self
    }
}

pub struct MockConnection {
    reply: Reply,
    position: usize,
    sent: Rc<RefCell<Vec<u8>>>,
}

impl MockConnection {
    fn limit(&self) -> usize {
        let end = self.reply.bytes.len();
        self.reply.stall_after.map_or(end, |stall| stall.min(end))
    }
}

impl Read for MockConnection {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.limit() - self.position);
        buf[..n].copy_from_slice(&self.reply.bytes[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}

impl Write for MockConnection {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.sent.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = ();

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Available for MockConnection {
    fn available(&mut self) -> usize {
        let remaining = self.limit() - self.position;
        self.reply.chunk.map_or(remaining, |chunk| chunk.min(remaining))
    }
}

impl Connection for MockConnection {}

/// Connector handing out one queued reply per connection.
#[derive(Default)]
pub struct MockNetwork {
    pub replies: VecDeque<Reply>,
    pub disconnected: bool,
    pub refuse: bool,
    /// Hosts connected to, in order.
    pub hosts: Vec<String>,
    /// Raw request bytes, one entry per connection.
    pub requests: Vec<Rc<RefCell<Vec<u8>>>>,
}

impl MockNetwork {
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn request_text(&self, index: usize) -> String {
        String::from_utf8_lossy(&self.requests[index].borrow()).into_owned()
    }

    /// Path of request `index`, taken from its request line.
    pub fn request_path(&self, index: usize) -> String {
        let text = self.request_text(index);
        text.split(' ').nth(1).unwrap_or_default().to_string()
    }
}

impl Connect for MockNetwork {
    type Connection = MockConnection;
    type Error = ();

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        if self.refuse {
            return Err(());
        }
        self.hosts.push(remote.to_string());
        let sent = Rc::new(RefCell::new(Vec::new()));
        self.requests.push(sent.clone());
        Ok(MockConnection {
            reply: self.replies.pop_front().unwrap_or_default(),
            position: 0,
            sent,
        })
    }
}

impl Link for MockNetwork {
    fn is_connected(&self) -> bool {
        !self.disconnected
    }
}

/// Counts sleeps instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub calls: u32,
    pub total_ms: u64,
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
    }
}
