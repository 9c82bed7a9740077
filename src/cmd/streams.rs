//! Stream commands.

use crate::{client::Client, dict::Dict, obj::RedisObject, stream::{Stream, StreamEntry, StreamId}};

fn parse_id_or_reply(c: &mut Client, raw: &[u8], default_seq: u64) -> Option<StreamId> {
    match StreamId::parse(raw, default_seq) {
        Some(id) => Some(id),
        None => {
            c.add_reply_error("ERR Invalid stream ID specified as stream command argument");
            None
        },
    }
}

pub fn xadd_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    if (argv.len() - 3) % 2 != 0 {
        c.add_reply_error("ERR wrong number of arguments for 'xadd' command");
        return;
    }

    let auto = argv[2] == b"*";
    let explicit_id = if auto {
        None
    } else {
        match parse_id_or_reply(c, &argv[2], 0) {
            Some(id) => Some(id),
            None => return,
        }
    };

    let fields: Vec<(Vec<u8>, Vec<u8>)> = argv[3..]
        .chunks(2)
        .map(|chunk| (chunk[0].clone(), chunk[1].clone()))
        .collect();

    let key = &argv[1];
    let added = match db.get_mut(key) {
        Some(RedisObject::Stream(stream)) => {
            let id = explicit_id.unwrap_or_else(|| stream.next_auto_id());
            stream.add(id, fields)
        },
        Some(_) => {
            c.add_reply_wrong_type();
            return;
        },
        None => {
            let mut stream = Stream::new();
            let id = explicit_id.unwrap_or_else(|| stream.next_auto_id());
            let added = stream.add(id, fields);
            if added.is_ok() {
                db.put(key.clone(), RedisObject::Stream(stream));
            }
            added
        },
    };

    match added {
        Ok(id) => c.add_reply_bulk_str(&id.format()),
        Err(()) => c.add_reply_error(
            "ERR The ID specified in XADD is equal or smaller than the target stream top item"),
    }
}

fn add_reply_entry(c: &mut Client, id: StreamId, fields: &[(Vec<u8>, Vec<u8>)]) {
    c.add_reply_multi_bulk_len(2);
    c.add_reply_bulk_str(&id.format());
    c.add_reply_multi_bulk_len(fields.len() * 2);
    for (field, value) in fields {
        c.add_reply_bulk(field);
        c.add_reply_bulk(value);
    }
}

pub fn xrange_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    // '-' and '+' are the open ends; a bare ms bounds the widest seq span
    let start = match &argv[2][..] {
        b"-" => StreamId::MIN,
        raw => match parse_id_or_reply(c, raw, 0) {
            Some(id) => id,
            None => return,
        },
    };
    let end = match &argv[3][..] {
        b"+" => StreamId::MAX,
        raw => match parse_id_or_reply(c, raw, u64::MAX) {
            Some(id) => id,
            None => return,
        },
    };

    match db.get(&argv[1]) {
        Some(RedisObject::Stream(stream)) => {
            let entries = stream.range(start, end);
            c.add_reply_multi_bulk_len(entries.len());
            for entry in entries {
                add_reply_entry(c, entry.id, &entry.fields);
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_multi_bulk_len(0),
    }
}

pub fn xread_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    // XREAD STREAMS key... id..., one id per key
    if !argv[1].eq_ignore_ascii_case(b"streams") {
        c.add_reply_error("ERR syntax error");
        return;
    }
    let rest = argv.len() - 2;
    if rest == 0 || rest % 2 != 0 {
        c.add_reply_error(
            "ERR Unbalanced XREAD list of streams: for each stream key an ID or '$' must be specified.");
        return;
    }

    let count = rest / 2;
    let keys = &argv[2..2 + count];
    let ids = &argv[2 + count..];

    // Resolve every id up front; a type mismatch on any key aborts the
    // whole command before a byte of reply goes out
    let mut after: Vec<StreamId> = Vec::with_capacity(count);
    for (key, raw) in keys.iter().zip(ids.iter()) {
        let stream = match db.get(key) {
            Some(RedisObject::Stream(stream)) => Some(stream),
            Some(_) => {
                c.add_reply_wrong_type();
                return;
            },
            None => None,
        };
        let id = if raw.as_slice() == b"$" {
            stream.and_then(|s| s.last_id()).unwrap_or(StreamId::MIN)
        } else {
            match parse_id_or_reply(c, raw, 0) {
                Some(id) => id,
                None => return,
            }
        };
        after.push(id);
    }

    c.add_reply_multi_bulk_len(count);
    for (key, id) in keys.iter().zip(after.into_iter()) {
        let entries: Vec<&StreamEntry> = match db.get(key) {
            Some(RedisObject::Stream(stream)) => stream.read(id),
            _ => Vec::new(),
        };
        c.add_reply_multi_bulk_len(2);
        c.add_reply_bulk(key);
        c.add_reply_multi_bulk_len(entries.len());
        for entry in entries {
            add_reply_entry(c, entry.id, &entry.fields);
        }
    }
}

pub fn xlen_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Stream(stream)) => {
            let len = stream.len();
            c.add_reply_integer(len as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_integer(0),
    }
}

#[cfg(test)]
mod tests {
    use crate::cmd::tests::run;
    use crate::dict::Dict;

    #[test]
    fn xadd_explicit_id_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"XADD", b"s", b"1-1", b"f", b"v"]), b"$3\r\n1-1\r\n");
        assert_eq!(run(&mut db, &[b"XADD", b"s", b"1-2", b"g", b"w"]), b"$3\r\n1-2\r\n");
        // Ids must strictly increase
        assert_eq!(run(&mut db, &[b"XADD", b"s", b"1-2", b"h", b"x"]),
            b"-ERR The ID specified in XADD is equal or smaller than the target stream top item\r\n".to_vec());
        assert_eq!(run(&mut db, &[b"XADD", b"s", b"0-9", b"h", b"x"]),
            b"-ERR The ID specified in XADD is equal or smaller than the target stream top item\r\n".to_vec());
        assert_eq!(run(&mut db, &[b"XLEN", b"s"]), b":2\r\n");
        assert_eq!(run(&mut db, &[b"XADD", b"s", b"nonsense", b"f", b"v"]),
            b"-ERR Invalid stream ID specified as stream command argument\r\n".to_vec());
    }

    #[test]
    fn xadd_auto_id_round_trip_test() {
        let mut db = Dict::new();
        let reply = run(&mut db, &[b"XADD", b"s", b"*", b"f", b"v"]);
        assert!(reply.starts_with(b"$"));

        // The XADD * ; XRANGE - + round trip yields the entry back
        let range = run(&mut db, &[b"XRANGE", b"s", b"-", b"+"]);
        assert!(range.starts_with(b"*1\r\n*2\r\n$"));
        assert!(range.ends_with(b"*2\r\n$1\r\nf\r\n$1\r\nv\r\n"));
    }

    #[test]
    fn xrange_test() {
        let mut db = Dict::new();
        for i in 1..=4 {
            let id = format!("{}-0", i);
            run(&mut db, &[b"XADD", b"s", id.as_bytes(), b"n", b"v"]);
        }
        let mid = run(&mut db, &[b"XRANGE", b"s", b"2", b"3"]);
        assert!(mid.starts_with(b"*2\r\n"));
        assert!(mid.windows(9).any(|w| w == b"$3\r\n2-0\r\n"));
        assert!(mid.windows(9).any(|w| w == b"$3\r\n3-0\r\n"));
        assert_eq!(run(&mut db, &[b"XRANGE", b"missing", b"-", b"+"]), b"*0\r\n");
    }

    #[test]
    fn xread_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"XADD", b"s", b"1-0", b"a", b"1"]);
        run(&mut db, &[b"XADD", b"s", b"2-0", b"b", b"2"]);

        // Strictly-greater-than semantics
        let reply = run(&mut db, &[b"XREAD", b"STREAMS", b"s", b"1-0"]);
        assert!(reply.starts_with(b"*1\r\n*2\r\n$1\r\ns\r\n*1\r\n"));
        assert!(reply.windows(9).any(|w| w == b"$3\r\n2-0\r\n"));
        assert!(!reply.windows(9).any(|w| w == b"$3\r\n1-0\r\n"));

        // '$' reads only entries newer than the current tail
        let reply = run(&mut db, &[b"XREAD", b"STREAMS", b"s", b"$"]);
        assert!(reply.ends_with(b"*0\r\n"));

        assert_eq!(run(&mut db, &[b"XREAD", b"nope", b"s", b"0"]), b"-ERR syntax error\r\n");
        assert_eq!(run(&mut db, &[b"XREAD", b"STREAMS", b"s", b"0", b"extra"]),
            b"-ERR Unbalanced XREAD list of streams: for each stream key an ID or '$' must be specified.\r\n".to_vec());
    }

    #[test]
    fn wrong_type_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"SET", b"k", b"v"]);
        assert_eq!(run(&mut db, &[b"XADD", b"k", b"*", b"f", b"v"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
        assert_eq!(run(&mut db, &[b"XRANGE", b"k", b"-", b"+"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
        assert_eq!(run(&mut db, &[b"XREAD", b"STREAMS", b"k", b"0"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
    }
}
