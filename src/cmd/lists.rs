//! List commands.

use crate::{client::Client, cmd::parse_integer_or_reply, dict::Dict, list::RedisList, obj::RedisObject};

pub fn lpush_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    push_generic_command(c, argv, db, true);
}

pub fn rpush_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    push_generic_command(c, argv, db, false);
}

fn push_generic_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict, front: bool) {
    let key = &argv[1];
    match db.get_mut(key) {
        Some(RedisObject::List(list)) => {
            for value in &argv[2..] {
                if front { list.push_front(value.clone()); } else { list.push_back(value.clone()); }
            }
            let len = list.len();
            c.add_reply_integer(len as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => {
            // New value: build it, publish it, then reply
            let mut list = RedisList::new();
            for value in &argv[2..] {
                if front { list.push_front(value.clone()); } else { list.push_back(value.clone()); }
            }
            let len = list.len();
            db.put(key.clone(), RedisObject::List(list));
            c.add_reply_integer(len as i64);
        },
    }
}

pub fn lrange_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let start = match parse_integer_or_reply(c, &argv[2]) {
        Some(v) => v,
        None => return,
    };
    let end = match parse_integer_or_reply(c, &argv[3]) {
        Some(v) => v,
        None => return,
    };

    match db.get(&argv[1]) {
        Some(RedisObject::List(list)) => {
            let values = list.range(start, end);
            c.add_reply_multi_bulk_len(values.len());
            for value in values {
                c.add_reply_bulk(&value);
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_multi_bulk_len(0),
    }
}

pub fn llen_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::List(list)) => {
            let len = list.len();
            c.add_reply_integer(len as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_integer(0),
    }
}

pub fn lpop_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    pop_generic_command(c, argv, db, true);
}

pub fn rpop_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    pop_generic_command(c, argv, db, false);
}

fn pop_generic_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict, front: bool) {
    let key = &argv[1];
    let (popped, now_empty) = match db.get_mut(key) {
        Some(RedisObject::List(list)) => {
            let popped = if front { list.pop_front() } else { list.pop_back() };
            (popped, list.is_empty())
        },
        Some(_) => {
            c.add_reply_wrong_type();
            return;
        },
        None => {
            c.add_reply_null_bulk();
            return;
        },
    };

    // A drained list does not linger in the keyspace
    if now_empty {
        db.remove(key);
    }
    match popped {
        Some(value) => c.add_reply_bulk(&value),
        None => c.add_reply_null_bulk(),
    }
}

pub fn lindex_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let index = match parse_integer_or_reply(c, &argv[2]) {
        Some(v) => v,
        None => return,
    };

    match db.get(&argv[1]) {
        Some(RedisObject::List(list)) => {
            match list.index(index) {
                Some(value) => c.add_reply_bulk(&value),
                None => c.add_reply_null_bulk(),
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_null_bulk(),
    }
}
