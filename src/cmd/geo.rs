//! Geospatial commands.

use crate::{client::Client, cmd::parse_float_or_reply, dict::Dict, obj::{GeoIndex, RedisObject}, util::format_double};

pub fn geoadd_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    if (argv.len() - 2) % 3 != 0 {
        c.add_reply_error("ERR wrong number of arguments for 'geoadd' command");
        return;
    }

    // Parse and range-check every triple before touching the keyspace
    let mut triples: Vec<(f64, f64, Vec<u8>)> = Vec::with_capacity((argv.len() - 2) / 3);
    for chunk in argv[2..].chunks(3) {
        let longitude = match parse_float_or_reply(c, &chunk[0]) {
            Some(v) => v,
            None => return,
        };
        let latitude = match parse_float_or_reply(c, &chunk[1]) {
            Some(v) => v,
            None => return,
        };
        if !GeoIndex::coordinates_valid(longitude, latitude) {
            c.add_reply_error("ERR invalid coordinates");
            return;
        }
        triples.push((longitude, latitude, chunk[2].clone()));
    }

    let key = &argv[1];
    match db.get_mut(key) {
        Some(RedisObject::Geo(geo)) => {
            let added = apply_triples(geo, triples);
            c.add_reply_integer(added);
        },
        Some(_) => c.add_reply_wrong_type(),
        None => {
            let mut geo = GeoIndex::new();
            let added = apply_triples(&mut geo, triples);
            db.put(key.clone(), RedisObject::Geo(geo));
            c.add_reply_integer(added);
        },
    }
}

fn apply_triples(geo: &mut GeoIndex, triples: Vec<(f64, f64, Vec<u8>)>) -> i64 {
    let mut added = 0i64;
    for (longitude, latitude, member) in triples {
        if geo.add(member, longitude, latitude) {
            added += 1;
        }
    }
    added
}

pub fn geopos_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    let geo = match db.get(&argv[1]) {
        Some(RedisObject::Geo(geo)) => Some(geo),
        Some(_) => {
            c.add_reply_wrong_type();
            return;
        },
        None => None,
    };

    // One sub-reply per requested member, null for the unknown ones
    let mut positions: Vec<Option<(f64, f64)>> = Vec::with_capacity(argv.len() - 2);
    for member in &argv[2..] {
        positions.push(match geo {
            Some(g) => g.get(member).map(|p| (p.longitude, p.latitude)),
            None => None,
        });
    }

    c.add_reply_multi_bulk_len(positions.len());
    for pos in positions {
        match pos {
            Some((longitude, latitude)) => {
                c.add_reply_multi_bulk_len(2);
                c.add_reply_bulk_str(&format_double(longitude));
                c.add_reply_bulk_str(&format_double(latitude));
            },
            None => c.add_reply_null_bulk(),
        }
    }
}

pub fn geodist_command(c: &mut Client, argv: &[Vec<u8>], db: &mut Dict) {
    match db.get(&argv[1]) {
        Some(RedisObject::Geo(geo)) => {
            match geo.dist(&argv[2], &argv[3]) {
                Some(distance) => c.add_reply_bulk_str(&format_double(distance)),
                None => c.add_reply_null_bulk(),
            }
        },
        Some(_) => c.add_reply_wrong_type(),
        None => c.add_reply_null_bulk(),
    }
}
