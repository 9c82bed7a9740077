//! Bitmap commands.

use crate::{client::Client, cmd::parse_integer_or_reply, dict::Dict, obj::{Bitmap, RedisObject}};

// Offsets are capped the classic way at 4 GiB worth of bits
const MAX_BIT_OFFSET: i64 = (4 * 1024 * 1024 * 1024 * 8) - 1;

fn parse_offset_or_reply(c: &mut Client, raw: &[u8]) -> Option<usize> {
    let offset = parse_integer_or_reply(c, raw)?;
    if offset < 0 || offset > MAX_BIT_OFFSET {
        c.add_reply_error("ERR bit offset is not an integer or out of range");
        return None;
    }
    Some(offset as usize)
}

pub fn setbit_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let offset = match parse_offset_or_reply(c, &argv[2]) {
        Some(v) => v,
        None => return,
    };
    let value = match &argv[3][..] {
        b"0" => false,
        b"1" => true,
        _ => {
            c.add_reply_error("ERR bit is not an integer or out of range");
            return;
        },
    };

    let key = &argv[1];
    match db.get_mut(key) {
        Some(RedisObject::Bitmap(bitmap)) => {
            let prev = bitmap.set(offset, value);
            c.add_reply_integer(prev as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => {
            let mut bitmap = Bitmap::new();
            let prev = bitmap.set(offset, value);
            db.put(key.clone(), RedisObject::Bitmap(bitmap));
            c.add_reply_integer(prev as i64);
        },
    }
}

pub fn getbit_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let offset = match parse_offset_or_reply(c, &argv[2]) {
        Some(v) => v,
        None => return,
    };

    match db.get(&argv[1]) {
        Some(RedisObject::Bitmap(bitmap)) => {
            let bit = bitmap.get(offset);
            c.add_reply_integer(bit as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_integer(0),
    }
}

pub fn bitcount_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    // BITCOUNT key [start end], the range given as inclusive byte offsets
    let range = match argv.len() {
        2 => None,
        4 => {
            let start = match parse_integer_or_reply(c, &argv[2]) {
                Some(v) => v,
                None => return,
            };
            let end = match parse_integer_or_reply(c, &argv[3]) {
                Some(v) => v,
                None => return,
            };
            Some((start, end))
        },
        _ => {
            c.add_reply_error("ERR syntax error");
            return;
        },
    };

    match db.get(&argv[1]) {
        Some(RedisObject::Bitmap(bitmap)) => {
            let count = bitmap.count(range);
            c.add_reply_integer(count as i64);
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
    fn setbit_getbit_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"SETBIT", b"b", b"7", b"1"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"GETBIT", b"b", b"7"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"SETBIT", b"b", b"7", b"0"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"GETBIT", b"b", b"7"]), b":0\r\n");
        // Reads beyond the written length are 0
        assert_eq!(run(&mut db, &[b"GETBIT", b"b", b"100000"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"GETBIT", b"missing", b"0"]), b":0\r\n");
    }

    #[test]
    fn setbit_bad_args_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"SETBIT", b"b", b"0", b"2"]),
            b"-ERR bit is not an integer or out of range\r\n");
        assert_eq!(run(&mut db, &[b"SETBIT", b"b", b"-1", b"1"]),
            b"-ERR bit offset is not an integer or out of range\r\n");
        assert_eq!(run(&mut db, &[b"SETBIT", b"b", b"xyz", b"1"]),
            b"-ERR value is not an integer or out of range\r\n");
        assert_eq!(run(&mut db, &[b"EXISTS", b"b"]), b":0\r\n");
    }

    #[test]
    fn bitcount_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"SETBIT", b"b", b"0", b"1"]);
        run(&mut db, &[b"SETBIT", b"b", b"9", b"1"]);
        run(&mut db, &[b"SETBIT", b"b", b"17", b"1"]);
        assert_eq!(run(&mut db, &[b"BITCOUNT", b"b"]), b":3\r\n");
        // Byte-offset ranges, inclusive on both ends
        assert_eq!(run(&mut db, &[b"BITCOUNT", b"b", b"0", b"0"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"BITCOUNT", b"b", b"1", b"2"]), b":2\r\n");
        assert_eq!(run(&mut db, &[b"BITCOUNT", b"b", b"-1", b"-1"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"BITCOUNT", b"missing"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"BITCOUNT", b"b", b"0"]), b"-ERR syntax error\r\n");
    }

    #[test]
    fn wrong_type_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"SET", b"k", b"v"]);
        assert_eq!(run(&mut db, &[b"SETBIT", b"k", b"0", b"1"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
        assert_eq!(run(&mut db, &[b"BITCOUNT", b"k"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
    }
}
