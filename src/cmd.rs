//! Command table and dispatch: case-insensitive name normalization, arity
//! checks, and routing to the type-family handlers.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use crate::{client::Client, dict::Dict};

pub mod bitmaps;
pub mod generic;
pub mod geo;
pub mod hashes;
pub mod hll;
pub mod lists;
pub mod sets;
pub mod streams;
pub mod strings;
pub mod zsets;

type CommandProc = fn(&mut Client, &[Vec<u8>], &mut Dict);

pub struct RedisCommand {
    name: &'static str,
    proc: CommandProc,
    arity: i32,         // positive = exact, negative = minimum
}

impl RedisCommand {
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn arity(&self) -> i32 {
        self.arity
    }
}

macro_rules! cmd {
    ($name:literal, $proc:path, $arity:literal) => {
        ($name, RedisCommand { name: $name, proc: $proc, arity: $arity })
    };
}

/// Command Table
static CMD_TABLE: Lazy<HashMap<&'static str, RedisCommand>> = Lazy::new(|| {
    HashMap::from([
        cmd!("ping", generic::ping_command, -1),
        cmd!("del", generic::del_command, -2),
        cmd!("exists", generic::exists_command, -2),
        cmd!("type", generic::type_command, 2),
        cmd!("dbsize", generic::dbsize_command, 1),
        cmd!("shutdown", generic::shutdown_command, 1),

        cmd!("set", strings::set_command, 3),
        cmd!("get", strings::get_command, 2),

        cmd!("lpush", lists::lpush_command, -3),
        cmd!("rpush", lists::rpush_command, -3),
        cmd!("lrange", lists::lrange_command, 4),
        cmd!("llen", lists::llen_command, 2),
        cmd!("lpop", lists::lpop_command, 2),
        cmd!("rpop", lists::rpop_command, 2),
        cmd!("lindex", lists::lindex_command, 3),

        cmd!("sadd", sets::sadd_command, -3),
        cmd!("srem", sets::srem_command, -3),
        cmd!("smembers", sets::smembers_command, 2),
        cmd!("sismember", sets::sismember_command, 3),
        cmd!("scard", sets::scard_command, 2),

        cmd!("zadd", zsets::zadd_command, -4),
        cmd!("zrem", zsets::zrem_command, -3),
        cmd!("zrange", zsets::zrange_command, -4),
        cmd!("zscore", zsets::zscore_command, 3),
        cmd!("zcard", zsets::zcard_command, 2),

        cmd!("hset", hashes::hset_command, -4),
        cmd!("hget", hashes::hget_command, 3),
        cmd!("hgetall", hashes::hgetall_command, 2),
        cmd!("hdel", hashes::hdel_command, -3),
        cmd!("hlen", hashes::hlen_command, 2),

        cmd!("setbit", bitmaps::setbit_command, 4),
        cmd!("getbit", bitmaps::getbit_command, 3),
        cmd!("bitcount", bitmaps::bitcount_command, -2),

        cmd!("pfadd", hll::pfadd_command, -3),
        cmd!("pfcount", hll::pfcount_command, -2),
        cmd!("pfmerge", hll::pfmerge_command, -3),

        cmd!("geoadd", geo::geoadd_command, -5),
        cmd!("geopos", geo::geopos_command, -3),
        cmd!("geodist", geo::geodist_command, 4),

        cmd!("xadd", streams::xadd_command, -5),
        cmd!("xrange", streams::xrange_command, 4),
        cmd!("xread", streams::xread_command, -4),
        cmd!("xlen", streams::xlen_command, 2),
    ])
});

pub fn lookup_command(name: &str) -> Option<&'static RedisCommand> {
    CMD_TABLE.get(name)
}

/// Run one parsed request against the keyspace. The dispatcher keeps no
/// state between commands; every error is replied to the client and the
/// connection lives on, QUIT and SHUTDOWN excepted.
pub fn process_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    if argv.is_empty() {
        return;
    }

    let name = String::from_utf8_lossy(&argv[0]).to_ascii_lowercase();

    // QUIT closes the connection and cannot be a normal command proc
    if name == "quit" {
        c.should_close = true;
        return;
    }

    let cmd = match lookup_command(&name) {
        Some(cmd) => cmd,
        None => {
            c.add_reply_error(&format!("ERR unknown command '{}'", name));
            return;
        },
    };

    let argc = argv.len() as i32;
    if (cmd.arity > 0 && argc != cmd.arity) || argc < -cmd.arity {
        c.add_reply_error(&format!("ERR wrong number of arguments for '{}' command", cmd.name));
        return;
    }

    (cmd.proc)(c, argv, db);
}

/// Parse a decimal argument, replying with the canonical error when it is
/// not a well-formed integer.
pub(crate) fn parse_integer_or_reply(c: &mut Client, raw: &[u8]) -> Option<i64> {
    match std::str::from_utf8(raw).ok().and_then(|s| s.parse().ok()) {
        Some(v) => Some(v),
        None => {
            c.add_reply_error("ERR value is not an integer or out of range");
            None
        },
    }
}

pub(crate) fn parse_float_or_reply(c: &mut Client, raw: &[u8]) -> Option<f64> {
    let parsed: Option<f64> = std::str::from_utf8(raw).ok().and_then(|s| s.trim().parse().ok());
    match parsed {
        Some(v) if !v.is_nan() => Some(v),
        _ => {
            c.add_reply_error("ERR value is not a valid float");
            None
        },
    }
}
