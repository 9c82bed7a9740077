//! Per-connection state. With multiplexing we need to take per-client
//! state; the server keeps clients in a table and services them in turn.

use std::net::Ipv4Addr;
use crate::net::{nonblock, tcp_no_delay};
use crate::proto;
use crate::util::format_double;

pub struct Client {
    fd: i32,
    pub addr: Option<(Ipv4Addr, u16)>,
    pub query_buf: Vec<u8>,             // bytes received, not yet parsed
    pub reply: Vec<u8>,                 // encoded replies waiting to be flushed
    pub authenticated: bool,            // reserved for a future AUTH command
    pub should_close: bool,
}

impl Client {
    pub fn create(fd: i32, ip: Ipv4Addr, port: u16) -> Result<Client, String> {
        nonblock(fd)?;
        tcp_no_delay(fd)?;
        Ok(Client {
            fd,
            addr: Some((ip, port)),
            query_buf: Vec::new(),
            reply: Vec::new(),
            authenticated: false,
            should_close: false,
        })
    }

    /// Commands always run in the context of a client; tests exercise the
    /// command layer through a fake one that has no socket and simply
    /// accumulates reply bytes.
    pub fn fake() -> Client {
        Client {
            fd: -1,
            addr: None,
            query_buf: Vec::new(),
            reply: Vec::new(),
            authenticated: false,
            should_close: false,
        }
    }

    pub fn fd(&self) -> i32 {
        self.fd
    }

    pub fn has_pending_reply(&self) -> bool {
        !self.reply.is_empty()
    }

    pub fn add_reply(&mut self, data: &[u8]) {
        self.reply.extend_from_slice(data);
    }

    pub fn add_reply_ok(&mut self) {
        self.reply.extend_from_slice(proto::OK);
    }

    pub fn add_reply_error(&mut self, msg: &str) {
        proto::encode_error(&mut self.reply, msg);
    }

    pub fn add_reply_wrong_type(&mut self) {
        self.reply.extend_from_slice(proto::WRONG_TYPE_ERR);
    }

    pub fn add_reply_integer(&mut self, value: i64) {
        match value {
            0 => self.reply.extend_from_slice(proto::CZERO),
            1 => self.reply.extend_from_slice(proto::CONE),
            _ => proto::encode_integer(&mut self.reply, value),
        }
    }

    pub fn add_reply_bulk(&mut self, data: &[u8]) {
        proto::encode_bulk(&mut self.reply, data);
    }

    pub fn add_reply_bulk_str(&mut self, s: &str) {
        proto::encode_bulk(&mut self.reply, s.as_bytes());
    }

    pub fn add_reply_bulk_double(&mut self, d: f64) {
        let s = format_double(d);
        proto::encode_bulk(&mut self.reply, s.as_bytes());
    }

    pub fn add_reply_null_bulk(&mut self) {
        self.reply.extend_from_slice(proto::NULL_BULK);
    }

    pub fn add_reply_multi_bulk_len(&mut self, count: usize) {
        if count == 0 {
            self.reply.extend_from_slice(proto::EMPTY_MULTI_BULK);
        } else {
            proto::encode_multi_bulk_len(&mut self.reply, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_buffer_test() {
        let mut c = Client::fake();
        assert!(!c.has_pending_reply());
        c.add_reply_ok();
        c.add_reply_integer(0);
        c.add_reply_integer(42);
        c.add_reply_bulk(b"hi");
        c.add_reply_null_bulk();
        c.add_reply_multi_bulk_len(0);
        assert_eq!(c.reply, b"+OK\r\n:0\r\n:42\r\n$2\r\nhi\r\n$-1\r\n*0\r\n");
        assert!(c.has_pending_reply());
    }

    #[test]
    fn reply_double_test() {
        let mut c = Client::fake();
        c.add_reply_bulk_double(1.0);
        c.add_reply_bulk_double(2.5);
        assert_eq!(c.reply, b"$1\r\n1\r\n$3\r\n2.5\r\n");
    }
}
