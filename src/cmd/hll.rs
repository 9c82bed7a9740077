//! Cardinality-sketch commands.

use crate::{client::Client, dict::Dict, obj::{HyperLogLog, RedisObject}};

pub fn pfadd_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let key = &argv[1];
    match db.get_mut(key) {
        Some(RedisObject::Hll(hll)) => {
            let mut changed = false;
            for element in &argv[2..] {
                if hll.add(element) {
                    changed = true;
                }
            }
            c.add_reply_integer(changed as i64);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => {
            let mut hll = HyperLogLog::new();
            let mut changed = false;
            for element in &argv[2..] {
                if hll.add(element) {
                    changed = true;
                }
            }
            db.put(key.clone(), RedisObject::Hll(hll));
            c.add_reply_integer(changed as i64);
        },
    }
}

pub fn pfcount_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    // Single key counts in place; several keys count their merged union.
    // Missing keys are empty sketches, mismatched ones are a type error.
    if argv.len() == 2 {
        match db.get(&argv[1]) {
            Some(RedisObject::Hll(hll)) => {
                let count = hll.count();
                c.add_reply_integer(count as i64);
            },
            Some(_) => c.add_reply_wrong_type(),
            None => c.add_reply_integer(0),
        }
        return;
    }

    let mut merged = HyperLogLog::new();
    for key in &argv[1..] {
        match db.get(key) {
            Some(RedisObject::Hll(hll)) => merged.merge(hll),
            Some(_) => {
                c.add_reply_wrong_type();
                return;
            },
            None => {},
        }
    }
    c.add_reply_integer(merged.count() as i64);
}

pub fn pfmerge_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let dest = &argv[1];

    // Check the destination's variant before building anything
    match db.get(dest) {
        Some(RedisObject::Hll(_)) | None => {},
        Some(_) => {
            c.add_reply_wrong_type();
            return;
        },
    }

    // Union the sources into a scratch sketch first so a bad source key
    // leaves the destination untouched
    let mut scratch = HyperLogLog::new();
    for key in &argv[2..] {
        match db.get(key) {
            Some(RedisObject::Hll(hll)) => scratch.merge(hll),
            Some(_) => {
                c.add_reply_wrong_type();
                return;
            },
            None => {},
        }
    }

    match db.get_mut(dest) {
        Some(RedisObject::Hll(hll)) => hll.merge(&scratch),
        _ => db.put(dest.clone(), RedisObject::Hll(scratch)),
    }
    c.add_reply_ok();
}
