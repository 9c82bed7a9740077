//! Hash commands.

use crate::{client::Client, dict::Dict, obj::{RedisHash, RedisObject}};

pub fn hset_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    if (argv.len() - 2) % 2 != 0 {
        c.add_reply_error("ERR wrong number of arguments for 'hset' command");
        return;
    }

    let key = &argv[1];
    match db.get_mut(key) {
        Some(RedisObject::Hash(hash)) => {
            let added = apply_pairs(hash, &argv[2..]);
            c.add_reply_integer(added);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => {
            let mut hash = RedisHash::new();
            let added = apply_pairs(&mut hash, &argv[2..]);
            db.put(key.clone(), RedisObject::Hash(hash));
            c.add_reply_integer(added);
        },
    }
}

fn apply_pairs(hash: &mut RedisHash, pairs: &[Vec<u8>]) -> i64 {
    let mut added = 0i64;
    for chunk in pairs.chunks(2) {
        if hash.set(chunk[0].clone(), chunk[1].clone()) {
            added += 1;
        }
    }
    added
}

pub fn hget_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Hash(hash)) => {
            match hash.get(&argv[2]) {
                Some(value) => c.add_reply_bulk(value),
                None => c.add_reply_null_bulk(),
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_null_bulk(),
    }
}

pub fn hgetall_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Hash(hash)) => {
            c.add_reply_multi_bulk_len(hash.len() * 2);
            for (field, value) in hash.iter() {
                c.add_reply_bulk(field);
                c.add_reply_bulk(value);
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_multi_bulk_len(0),
    }
}

pub fn hdel_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let key = &argv[1];
    let (removed, now_empty) = match db.get_mut(key) {
        Some(RedisObject::Hash(hash)) => {
            let mut removed = 0i64;
            for field in &argv[2..] {
                if hash.remove(field) {
                    removed += 1;
                }
            }
            (removed, hash.is_empty())
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

pub fn hlen_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Hash(hash)) => {
            let len = hash.len();
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
    fn hset_hget_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"HSET", b"h", b"f1", b"v1", b"f2", b"v2"]), b":2\r\n");
        // Updating an existing field is not an add
        assert_eq!(run(&mut db, &[b"HSET", b"h", b"f1", b"v1bis"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"HGET", b"h", b"f1"]), b"$5\r\nv1bis\r\n");
        assert_eq!(run(&mut db, &[b"HGET", b"h", b"nope"]), b"$-1\r\n");
        assert_eq!(run(&mut db, &[b"HGET", b"missing", b"f"]), b"$-1\r\n");
        assert_eq!(run(&mut db, &[b"HLEN", b"h"]), b":2\r\n");
    }

    #[test]
    fn hset_odd_args_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"HSET", b"h", b"f1", b"v1", b"f2"]),
            b"-ERR wrong number of arguments for 'hset' command\r\n");
    }

    #[test]
    fn hgetall_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"HSET", b"h", b"f", b"v"]);
        assert_eq!(run(&mut db, &[b"HGETALL", b"h"]), b"*2\r\n$1\r\nf\r\n$1\r\nv\r\n");
        assert_eq!(run(&mut db, &[b"HGETALL", b"missing"]), b"*0\r\n");
    }

    #[test]
    fn hdel_auto_delete_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"HSET", b"h", b"f1", b"v1", b"f2", b"v2"]);
        assert_eq!(run(&mut db, &[b"HDEL", b"h", b"f1", b"nope"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"HDEL", b"h", b"f2"]), b":1\r\n");
        assert_eq!(run(&mut db, &[b"EXISTS", b"h"]), b":0\r\n");
        assert_eq!(run(&mut db, &[b"HDEL", b"h", b"f1"]), b":0\r\n");
    }

    #[test]
    fn wrong_type_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"SET", b"k", b"v"]);
        assert_eq!(run(&mut db, &[b"HSET", b"k", b"f", b"v"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
        assert_eq!(run(&mut db, &[b"HGETALL", b"k"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
    }
}
