//! String commands.

use crate::{client::Client, dict::Dict, obj::RedisObject};

/// SET is the one write that replaces a key regardless of its current
/// variant.
pub fn set_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    db.put(argv[1].clone(), RedisObject::String(argv[2].clone()));
    c.add_reply_ok();
}

pub fn get_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::String(value)) => c.add_reply_bulk(value),
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_null_bulk(),
    }
}

#[cfg(test)]
mod tests {
    use crate::cmd::tests::run;
    use crate::dict::Dict;

    #[test]
    fn set_get_test() {
        let mut db = Dict::new();
        assert_eq!(run(&mut db, &[b"SET", b"k", b"v"]), b"+OK\r\n");
        assert_eq!(run(&mut db, &[b"GET", b"k"]), b"$1\r\nv\r\n");
        assert_eq!(run(&mut db, &[b"GET", b"missing"]), b"$-1\r\n");
    }

    #[test]
    fn set_get_binary_test() {
        let mut db = Dict::new();
        let value: Vec<u8> = vec![0, 1, 2, 255, b'\r', b'\n', 128];
        let mut expected = format!("${}\r\n", value.len()).into_bytes();
        expected.extend_from_slice(&value);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(run(&mut db, &[b"SET", b"bin", &value]), b"+OK\r\n");
        assert_eq!(run(&mut db, &[b"GET", b"bin"]), expected);
    }

    #[test]
    fn set_replaces_any_type_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"LPUSH", b"k", b"x"]);
        assert_eq!(run(&mut db, &[b"SET", b"k", b"v"]), b"+OK\r\n");
        assert_eq!(run(&mut db, &[b"GET", b"k"]), b"$1\r\nv\r\n");
    }

    #[test]
    fn get_wrong_type_test() {
        let mut db = Dict::new();
        run(&mut db, &[b"LPUSH", b"l", b"x"]);
        assert_eq!(run(&mut db, &[b"GET", b"l"]),
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec());
    }
}
