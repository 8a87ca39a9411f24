//! Test support: a tiny MaxMind DB writer.
//!
//! Produces IPv4-only databases (24-bit records) holding one record per
//! host address, enough to drive the real `maxminddb` reader.

#![allow(dead_code)]

use std::net::Ipv4Addr;

const METADATA_MARKER: &[u8] = b"\xab\xcd\xefMaxMind.com";
const DATA_SECTION_SEPARATOR: [u8; 16] = [0; 16];

/// A value in the MaxMind DB data format.
pub enum Value {
    Str(&'static str),
    Double(f64),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Map(Vec<(&'static str, Value)>),
    Array(Vec<Value>),
}

impl Value {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Value::Str(s) => {
                control(out, 2, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            Value::Double(v) => {
                control(out, 3, 8);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Value::U16(v) => uint(out, 5, u64::from(*v)),
            Value::U32(v) => uint(out, 6, u64::from(*v)),
            Value::U64(v) => uint(out, 9, *v),
            Value::Bool(v) => control(out, 14, usize::from(*v)),
            Value::Map(entries) => {
                control(out, 7, entries.len());
                for (key, value) in entries {
                    Value::Str(*key).encode(out);
                    value.encode(out);
                }
            }
            Value::Array(items) => {
                control(out, 11, items.len());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }
}

/// Control byte, extended type byte and size extension, in that order.
fn control(out: &mut Vec<u8>, type_num: u8, size: usize) {
    assert!(size < 29 + 256, "fixture values must stay small");
    let (size_bits, extra) = if size < 29 {
        (size as u8, None)
    } else {
        (29, Some((size - 29) as u8))
    };

    if type_num <= 7 {
        out.push((type_num << 5) | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend(extra);
}

fn uint(out: &mut Vec<u8>, type_num: u8, value: u64) {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    control(out, type_num, bytes.len() - first);
    out.extend_from_slice(&bytes[first..]);
}

#[derive(Clone, Copy)]
enum Record {
    Empty,
    Node(usize),
    Data(usize),
}

/// Build a database mapping each host address to its record.
pub fn build(database_type: &'static str, hosts: Vec<(Ipv4Addr, Value)>) -> Vec<u8> {
    let mut nodes: Vec<[Record; 2]> = vec![[Record::Empty; 2]];
    let mut data = Vec::new();
    let mut offsets = Vec::new();

    for (index, (addr, value)) in hosts.iter().enumerate() {
        offsets.push(data.len());
        value.encode(&mut data);

        let bits = u32::from(*addr);
        let mut node = 0;
        for depth in 0..32 {
            let bit = ((bits >> (31 - depth)) & 1) as usize;
            if depth == 31 {
                nodes[node][bit] = Record::Data(index);
                break;
            }
            node = match nodes[node][bit] {
                Record::Node(next) => next,
                _ => {
                    nodes.push([Record::Empty; 2]);
                    let next = nodes.len() - 1;
                    nodes[node][bit] = Record::Node(next);
                    next
                }
            };
        }
    }

    let node_count = nodes.len();
    let mut out = Vec::new();
    for node in &nodes {
        for record in node {
            let value = match record {
                Record::Empty => node_count,
                Record::Node(next) => *next,
                Record::Data(index) => node_count + DATA_SECTION_SEPARATOR.len() + offsets[*index],
            };
            out.extend_from_slice(&(value as u32).to_be_bytes()[1..]);
        }
    }
    out.extend_from_slice(&DATA_SECTION_SEPARATOR);
    out.extend_from_slice(&data);

    out.extend_from_slice(METADATA_MARKER);
    Value::Map(vec![
        ("binary_format_major_version", Value::U16(2)),
        ("binary_format_minor_version", Value::U16(0)),
        ("build_epoch", Value::U64(1_704_153_600)),
        ("database_type", Value::Str(database_type)),
        ("description", Value::Map(vec![("en", Value::Str("test fixture"))])),
        ("ip_version", Value::U16(4)),
        ("languages", Value::Array(vec![Value::Str("en")])),
        ("node_count", Value::U32(node_count as u32)),
        ("record_size", Value::U16(24)),
    ])
    .encode(&mut out);

    out
}

fn names(en: &'static str) -> Value {
    Value::Map(vec![("en", Value::Str(en))])
}

/// A GeoLite2-City style database with two hosts:
///
/// * `81.2.69.142`: full city record (London, England, GB)
/// * `89.160.20.112`: country-level record only (SE)
pub fn city_database() -> Vec<u8> {
    let london = Value::Map(vec![
        (
            "city",
            Value::Map(vec![
                ("geoname_id", Value::U32(2643743)),
                ("names", names("London")),
            ]),
        ),
        (
            "continent",
            Value::Map(vec![
                ("code", Value::Str("EU")),
                ("geoname_id", Value::U32(6255148)),
                ("names", names("Europe")),
            ]),
        ),
        (
            "country",
            Value::Map(vec![
                ("geoname_id", Value::U32(2635167)),
                ("is_in_european_union", Value::Bool(false)),
                ("iso_code", Value::Str("GB")),
                ("names", names("United Kingdom")),
            ]),
        ),
        (
            "location",
            Value::Map(vec![
                ("accuracy_radius", Value::U16(10)),
                ("latitude", Value::Double(51.5142)),
                ("longitude", Value::Double(-0.0931)),
                ("time_zone", Value::Str("Europe/London")),
            ]),
        ),
        ("postal", Value::Map(vec![("code", Value::Str("EC2V"))])),
        (
            "subdivisions",
            Value::Array(vec![Value::Map(vec![
                ("geoname_id", Value::U32(6269131)),
                ("iso_code", Value::Str("ENG")),
                ("names", names("England")),
            ])]),
        ),
    ]);

    let sweden = Value::Map(vec![(
        "country",
        Value::Map(vec![
            ("geoname_id", Value::U32(2661886)),
            ("is_in_european_union", Value::Bool(true)),
            ("iso_code", Value::Str("SE")),
            ("names", names("Sweden")),
        ]),
    )]);

    build(
        "GeoLite2-City",
        vec![
            (Ipv4Addr::new(81, 2, 69, 142), london),
            (Ipv4Addr::new(89, 160, 20, 112), sweden),
        ],
    )
}
