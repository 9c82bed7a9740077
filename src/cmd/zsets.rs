//! Sorted-set commands.

use crate::{client::Client, cmd::{parse_float_or_reply, parse_integer_or_reply}, dict::Dict, obj::{RedisObject, SortedSet}};

pub fn zadd_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    if (argv.len() - 2) % 2 != 0 {
        c.add_reply_error("ERR wrong number of arguments for 'zadd' command");
        return;
    }

    // Every score must parse before anything is touched
    let mut pairs: Vec<(f64, Vec<u8>)> = Vec::with_capacity((argv.len() - 2) / 2);
    for chunk in argv[2..].chunks(2) {
        let score = match parse_float_or_reply(c, &chunk[0]) {
            Some(s) => s,
            None => return,
        };
        pairs.push((score, chunk[1].clone()));
    }

    let key = &argv[1];
    match db.get_mut(key) {
        Some(RedisObject::ZSet(zset)) => {
            let added = apply_pairs(zset, pairs);
            c.add_reply_integer(added);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => {
            let mut zset = SortedSet::new();
            let added = apply_pairs(&mut zset, pairs);
            db.put(key.clone(), RedisObject::ZSet(zset));
            c.add_reply_integer(added);
        },
    }
}

fn apply_pairs(zset: &mut SortedSet, pairs: Vec<(f64, Vec<u8>)>) -> i64 {
    let mut added = 0i64;
    for (score, member) in pairs {
        if zset.add(member, score) {
            added += 1;
        }
    }
    added
}

pub fn zrem_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let key = &argv[1];
    let (removed, now_empty) = match db.get_mut(key) {
        Some(RedisObject::ZSet(zset)) => {
            let mut removed = 0i64;
            for member in &argv[2..] {
                if zset.remove(member) {
                    removed += 1;
                }
            }
            (removed, zset.is_empty())
        },
        Some(_) => {
            c.add_reply_wrong_type();
            return;
        },
        None => {
            c.add_reply_integer(0);
            return;
        },
    };

    if now_empty {
        db.remove(key);
    }
    c.add_reply_integer(removed);
}

pub fn zrange_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let withscores = match argv.len() {
        4 => false,
        5 if argv[4].eq_ignore_ascii_case(b"withscores") => true,
        _ => {
            c.add_reply_error("ERR syntax error");
            return;
        },
    };

    let start = match parse_integer_or_reply(c, &argv[2]) {
        Some(v) => v,
        None => return,
    };
    let end = match parse_integer_or_reply(c, &argv[3]) {
        Some(v) => v,
        None => return,
    };

    match db.get(&argv[1]) {
        Some(RedisObject::ZSet(zset)) => {
            let entries = zset.range(start, end);
            let count = if withscores { entries.len() * 2 } else { entries.len() };
            c.add_reply_multi_bulk_len(count);
            for (member, score) in entries {
                c.add_reply_bulk(&member);
                if withscores {
                    c.add_reply_bulk_double(score);
                }
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_multi_bulk_len(0),
    }
}

pub fn zscore_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::ZSet(zset)) => {
            match zset.score(&argv[2]) {
                Some(score) => c.add_reply_bulk_double(score),
                None => c.add_reply_null_bulk(),
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_null_bulk(),
    }
}

pub fn zcard_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::ZSet(zset)) => {
            let len = zset.len();
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
    fn zadd_zrange_test() {
        let mut db = Dict::new();
        // Ties break by member lex order
        assert_eq!(run(&mut db, &[b"ZADD", b"z", b"1", b"b", b"1", b"a", b"2", b"c"]), b":3\r\n");
        assert_eq!(run(&mut db, &[b"ZRANGE", b"z", b"0", b"-1"]),
            b"*3\r\n$1\r\na\r\n$1\r\nb\r\n$1\r\nc\r\n");

        // Re-scoring moves the member without growing the set
        assert_eq!(run(&mut db, &[b"ZADD", b"z", b"9", b"a"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"ZRANGE", b"z", b"0", b"-1"]),
            b"*3\r\n$1\r\nb\r\n$1\r\nc\r\n$1\r\na\r\n");
        assert_eq!(run(&mut db, &[b"ZCARD", b"z"]), b":3\r\n");
    }

    #[test]
    fn zrange_withscores_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"ZADD", b"z", b"1", b"a", b"2.5", b"b"]);
        assert_eq!(run(&mut db, &[b"ZRANGE", b"z", b"0", b"-1", b"WITHSCORES"]),
            b"*4\r\n$1\r\na\r\n$1\r\n1\r\n$1\r\nb\r\n$3\r\n2.5\r\n");
        assert_eq!(run(&mut db, &[b"ZRANGE", b"z", b"0", b"-1", b"bogus"]),
            b"-ERR syntax error\r\n");
    }

    #[test]
    fn zscore_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"ZADD", b"z", b"1.5", b"m"]);
        assert_eq!(run(&mut db, &[b"ZSCORE", b"z", b"m"]), b"$3\r\n1.5\r\n");
        assert_eq!(run(&mut db, &[b"ZSCORE", b"z", b"missing"]), b"$-1\r\n");
        assert_eq!(run(&mut db, &[b"ZSCORE", b"nokey", b"m"]), b"$-1\r\n");
    }

    #[test]
    fn zadd_bad_score_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"ZADD", b"z", b"abc", b"m"]),
            b"-ERR value is not a valid float\r\n");
        // Nothing was committed
        assert_eq!(run(&mut db, &[b"EXISTS", b"z"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"ZADD", b"z", b"1", b"m", b"2"]),
            b"-ERR wrong number of arguments for 'zadd' command\r\n");
    }

    #[test]
    fn zrem_auto_delete_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"ZADD", b"z", b"1", b"a", b"2", b"b"]);
        assert_eq!(run(&mut db, &[b"ZREM", b"z", b"a", b"nope"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"ZREM", b"z", b"b"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"EXISTS", b"z"]), b":0\r\n");
    }

    #[test]
    fn wrong_type_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"SET", b"k", b"v"]);
        assert_eq!(run(&mut db, &[b"ZADD", b"k", b"1", b"m"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
        assert_eq!(run(&mut db, &[b"ZSCORE", b"k", b"m"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
    }
}
