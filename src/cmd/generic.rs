//! Commands that work on the keyspace itself rather than on one value
//! family.

use crate::{client::Client, dict::Dict, log::{log, LogLevel}, proto, server};

pub fn ping_command(c: &mut Client, argv: &[Vec<u8>], _db: &mut Dict) {
    match argv.len() {
        1 => c.add_reply(proto::PONG),
        2 => c.add_reply_bulk(&argv[1]),
        _ => c.add_reply_error("ERR wrong number of arguments for 'ping' command"),
    }
}

pub fn del_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let mut deleted = 0i64;
    for key in &argv[1..] {
        if db.remove(key).is_some() {
            deleted += 1;
        }
    }
    c.add_reply_integer(deleted);
}

pub fn exists_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let mut found = 0i64;
    for key in &argv[1..] {
        if db.contains(key) {
            found += 1;
        }
    }
    c.add_reply_integer(found);
}

pub fn type_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let name = match db.get(&argv[1]) {
        Some(obj) => obj.type_name(),
        None => "none",
    };
    c.add_reply(format!("+{}\r\n", name).as_bytes());
}

pub fn dbsize_command(c: &mut Client, _argv: &[Vec<u8>], db: &mut Dict) {
    c.add_reply_integer(db.len() as i64);
}

/// Flip the run flag; the loop drains and exits at its next iteration.
/// No reply is sent, the connection goes down with the server.
pub fn shutdown_command(c: &mut Client, _argv: &[Vec<u8>], _db: &mut Dict) {
    log(LogLevel::Warning, "User requested shutdown");
    server::set_running(false);
    c.should_close = true;
}

#[cfg(test)]
mod tests {
    use crate::cmd::tests::run;
    use crate::dict::Dict;

    #[test]
    fn ping_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"PING"]), b"+PONG\r\n");
        assert_eq!(run(&mut db, &[b"PING", b"hello"]), b"$5\r\nhello\r\n");
    }

    #[test]
    fn del_exists_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"SET", b"a", b"1"]);
        run(&mut db, &[b"SET", b"b", b"2"]);
        assert_eq!(run(&mut db, &[b"EXISTS", b"a", b"b", b"c"]), b":2\r\n");
        assert_eq!(run(&mut db, &[b"DEL", b"a", b"c"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"DEL", b"a"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"EXISTS", b"a"]), b":0\r\n");
    }

    #[test]
    fn type_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"SET", b"s", b"v"]);
        run(&mut db, &[b"LPUSH", b"l", b"v"]);
        assert_eq!(run(&mut db, &[b"TYPE", b"s"]), b"+string\r\n");
        assert_eq!(run(&mut db, &[b"TYPE", b"l"]), b"+list\r\n");
        assert_eq!(run(&mut db, &[b"TYPE", b"missing"]), b"+none\r\n");
    }

    #[test]
    fn dbsize_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"DBSIZE"]), b":0\r\n");
        run(&mut db, &[b"SET", b"a", b"1"]);
        assert_eq!(run(&mut db, &[b"DBSIZE"]), b":1\r\n");
    }
}
