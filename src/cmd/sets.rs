//! Set commands.

use crate::{client::Client, dict::Dict, obj::{RedisObject, RedisSet}};

pub fn sadd_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let key = &argv[1];
    match db.get_mut(key) {
        Some(RedisObject::Set(set)) => {
            let mut added = 0i64;
            for member in &argv[2..] {
                if set.add(member.clone()) {
                    added += 1;
                }
            }
            c.add_reply_integer(added);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => {
            let mut set = RedisSet::new();
            let mut added = 0i64;
            for member in &argv[2..] {
                if set.add(member.clone()) {
                    added += 1;
                }
            }
            db.put(key.clone(), RedisObject::Set(set));
            c.add_reply_integer(added);
        },
    }
}

pub fn srem_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let key = &argv[1];
    let (removed, now_empty) = match db.get_mut(key) {
        Some(RedisObject::Set(set)) => {
            let mut removed = 0i64;
            for member in &argv[2..] {
                if set.remove(member) {
                    removed += 1;
                }
            }
            (removed, set.is_empty())
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

pub fn smembers_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Set(set)) => {
            c.add_reply_multi_bulk_len(set.len());
            for member in set.iter() {
                c.add_reply_bulk(member);
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_multi_bulk_len(0),
    }
}

pub fn sismember_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Set(set)) => {
            let hit = set.contains(&argv[2]);
            c.add_reply_integer(hit as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_integer(0),
    }
}

pub fn scard_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Set(set)) => {
            let len = set.len();
            c.add_reply_integer(len as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_integer(0),
    }
}
