//! Per-source tokenizers feeding one structured rule builder.
//!
//! Every source is reduced to the same two parts before building:
//! - a list of field tokens (`cookie=..`, `table=..`, `priority=..`, match fields)
//! - the action clause (text after `actions=`, kept verbatim minus whitespace)
//!
//! The action clause contains commas (`resubmit(,21)`), so it is cut off
//! before any comma splitting happens.

use crate::{CanonicalRule, ParseError, SourceFormat, DEFAULT_PRIORITY};

const DEBUG_LOG_MARKER: &str = "flow:";
const PROTOCOL_LOG_MARKER: &str = " ADD ";
const ACTIONS_KEY: &str = "actions=";

/// Runtime counters that differ between two dumps of the same rule.
const VOLATILE_KEYS: &[&str] = &["duration", "n_packets", "n_bytes", "idle_age", "hard_age"];

/// Flow-mod parameters `ovs-ofctl` prints as `key=value`. The protocol log
/// prints them as `idle:`/`hard:`/`importance:` and the ofctrl debug log not
/// at all, so they are not part of a rule's identity.
const FLOW_MOD_PARAMS: &[&str] = &["idle_timeout", "hard_timeout", "importance"];

/// Flow-mod flags `ovs-ofctl` prints as bare words; they are not match fields.
const FLOW_MOD_FLAGS: &[&str] = &[
    "send_flow_rem",
    "check_overlap",
    "reset_counts",
    "no_packet_counts",
    "no_byte_counts",
];

/// Canonicalize one raw line from `source`.
pub fn canonicalize(line: &str, source: SourceFormat) -> Result<CanonicalRule, ParseError> {
    match source {
        SourceFormat::DebugLog => parse_debug_log(line),
        SourceFormat::LiveDump => parse_live_dump(line),
        SourceFormat::ProtocolLog => parse_protocol_log(line),
    }
}

/// Convenience wrapper returning the canonical string directly.
pub fn canonical_string(line: &str, source: SourceFormat) -> Result<String, ParseError> {
    canonicalize(line, source).map(|r| r.to_string())
}

// ---------------------------------------------------------------------------
// Source tokenizers
// ---------------------------------------------------------------------------

/// `...|ofctrl|DBG|ofctrl_add_flow flow: cookie=33d9a01c, table_id=20, priority=100, reg0=..., actions=...`
fn parse_debug_log(line: &str) -> Result<CanonicalRule, ParseError> {
    let source = SourceFormat::DebugLog;
    let (_, body) = line
        .split_once(DEBUG_LOG_MARKER)
        .ok_or(ParseError::MissingMarker {
            source,
            marker: DEBUG_LOG_MARKER,
        })?;

    let body = strip_whitespace(body);
    let (head, actions) = split_actions(&body, source)?;
    build(head.split(','), actions)
}

/// ` cookie=0x33d9a01c, duration=2962.254s, table=20, n_packets=0, ... priority=100,reg0=... actions=...`
///
/// Whitespace separates fields here the same way commas do.
fn parse_live_dump(line: &str) -> Result<CanonicalRule, ParseError> {
    let source = SourceFormat::LiveDump;
    let (head, actions) = split_actions(line.trim(), source)?;
    let actions = strip_whitespace(actions);
    build(head.split(|c: char| c == ',' || c.is_whitespace()), &actions)
}

/// `...OFPT_FLOW_MOD (OF1.3) (xid=0x36c): ADD table:20 priority=100,reg0=... cookie:0x507e59f3 actions=...`
///
/// Fields come as space-separated positional tokens: `table:N` and `cookie:X`
/// use a colon, the priority and match fields form one comma-joined token.
/// Other `key:value` tokens (`idle:`, `hard:`, `importance:`) and bare flags
/// are flow-mod metadata and are dropped.
fn parse_protocol_log(line: &str) -> Result<CanonicalRule, ParseError> {
    let source = SourceFormat::ProtocolLog;
    let (_, rest) = line
        .split_once(PROTOCOL_LOG_MARKER)
        .ok_or(ParseError::MissingMarker {
            source,
            marker: PROTOCOL_LOG_MARKER,
        })?;

    let (head, actions) = split_actions(rest.trim_end(), source)?;
    let actions = strip_whitespace(actions);

    let mut fields: Vec<String> = Vec::new();
    for token in head.split_whitespace() {
        if let Some(v) = token.strip_prefix("table:") {
            fields.push(format!("table={v}"));
        } else if let Some(v) = token.strip_prefix("cookie:") {
            fields.push(format!("cookie={v}"));
        } else if token.contains('=') {
            fields.extend(token.split(',').map(str::to_string));
        }
    }

    build(fields.iter().map(String::as_str), &actions)
}

// ---------------------------------------------------------------------------
// Shared builder
// ---------------------------------------------------------------------------

fn build<'a, I>(tokens: I, actions: &str) -> Result<CanonicalRule, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    let mut cookie: u64 = 0;
    let mut table: u32 = 0;
    let mut priority: u32 = DEFAULT_PRIORITY;
    let mut matches: Vec<String> = Vec::new();

    for token in tokens.filter(|t| !t.is_empty()) {
        let (key, value) = match token.split_once('=') {
            Some(kv) => kv,
            None if FLOW_MOD_FLAGS.contains(&token) => continue,
            // Bare protocol shorthands (`ip`, `arp`) are match fields.
            None => {
                matches.push(token.to_string());
                continue;
            }
        };

        match key {
            "cookie" => cookie = parse_cookie(value)?,
            "table" | "table_id" => table = parse_u32("table", value)?,
            "priority" => priority = parse_u32("priority", value)?,
            k if VOLATILE_KEYS.contains(&k) || FLOW_MOD_PARAMS.contains(&k) => {}
            _ => matches.push(token.to_string()),
        }
    }

    Ok(CanonicalRule {
        cookie,
        table,
        priority,
        matches,
        actions: actions.to_string(),
    })
}

fn split_actions(text: &str, source: SourceFormat) -> Result<(&str, &str), ParseError> {
    let idx = text
        .find(ACTIONS_KEY)
        .ok_or(ParseError::MissingActions { source })?;
    Ok((&text[..idx], &text[idx + ACTIONS_KEY.len()..]))
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Cookies are hex with or without the `0x` prefix depending on the source.
fn parse_cookie(raw: &str) -> Result<u64, ParseError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u64::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidNumber {
        field: "cookie",
        raw: raw.to_string(),
    })
}

fn parse_u32(field: &'static str, raw: &str) -> Result<u32, ParseError> {
    raw.parse::<u32>().map_err(|_| ParseError::InvalidNumber {
        field,
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL_20: &str = "cookie=0x33d9a01c,table=20,priority=100,reg0=0xac10005b,\
reg15=0x3,metadata=0x144,actions=set_field:fa:16:3e:5b:d3:19->eth_dst,resubmit(,21)";

    #[test]
    fn debug_log_line_is_massaged_into_canonical_form() {
        let line = "2022-02-11T08:25:46.572Z|2419719|ofctrl|DBG|ofctrl_add_flow flow: \
cookie=33d9a01c, table_id=20, priority=100, reg0=0xac10005b,reg15=0x3,metadata=0x144, \
actions=set_field:fa:16:3e:5b:d3:19->eth_dst,resubmit(,21)";
        assert_eq!(
            canonical_string(line, SourceFormat::DebugLog).unwrap(),
            CANONICAL_20
        );
    }

    #[test]
    fn live_dump_line_drops_runtime_counters() {
        let line = " cookie=0x33d9a01c, duration=2962.254s, table=20, n_packets=0, n_bytes=0, \
idle_age=2962, priority=100,reg0=0xac10005b,reg15=0x3,metadata=0x144 \
actions=set_field:fa:16:3e:5b:d3:19->eth_dst,resubmit(,21)";
        assert_eq!(
            canonical_string(line, SourceFormat::LiveDump).unwrap(),
            CANONICAL_20
        );
    }

    #[test]
    fn live_dump_drops_hard_age_too() {
        let line = "cookie=0x1, duration=5s, table=20, n_packets=3, n_bytes=180, idle_age=1, \
hard_age=4, priority=10,metadata=0x2 actions=drop";
        assert_eq!(
            canonical_string(line, SourceFormat::LiveDump).unwrap(),
            "cookie=0x1,table=20,priority=10,metadata=0x2,actions=drop"
        );
    }

    #[test]
    fn live_dump_drops_timeouts_and_importance() {
        let line = "cookie=0xa, duration=1s, table=20, n_packets=0, n_bytes=0, idle_timeout=30, \
hard_timeout=60, importance=4, idle_age=1, priority=5,metadata=0x2 actions=drop";
        assert_eq!(
            canonical_string(line, SourceFormat::LiveDump).unwrap(),
            "cookie=0xa,table=20,priority=5,metadata=0x2,actions=drop"
        );
    }

    #[test]
    fn protocol_log_reorders_positional_tokens() {
        let line = "2022-02-14T21:50:28.287Z|00356|vconn|DBG|unix#3: received: OFPT_FLOW_MOD \
(OF1.3) (xid=0x36c): ADD table:20 priority=100,reg0=0xc0a815dd,reg15=0x3,metadata=0x2 \
cookie:0x507e59f3 actions=set_field:fa:16:3e:fb:18:f3->eth_dst,resubmit(,21)";
        assert_eq!(
            canonical_string(line, SourceFormat::ProtocolLog).unwrap(),
            "cookie=0x507e59f3,table=20,priority=100,reg0=0xc0a815dd,reg15=0x3,\
metadata=0x2,actions=set_field:fa:16:3e:fb:18:f3->eth_dst,resubmit(,21)"
        );
    }

    #[test]
    fn protocol_log_drops_flow_mod_metadata() {
        let line = "x: ADD table:20 priority=5,metadata=0x2 idle:30 send_flow_rem cookie:0xa actions=drop";
        assert_eq!(
            canonical_string(line, SourceFormat::ProtocolLog).unwrap(),
            "cookie=0xa,table=20,priority=5,metadata=0x2,actions=drop"
        );
    }

    #[test]
    fn missing_priority_takes_openflow_default() {
        let r = canonicalize("cookie=0x0, table=20, ip actions=drop", SourceFormat::LiveDump)
            .unwrap();
        assert_eq!(r.priority, DEFAULT_PRIORITY);
        assert_eq!(r.matches, vec!["ip".to_string()]);
    }

    #[test]
    fn canonical_string_is_a_fixed_point() {
        let once = canonical_string(CANONICAL_20, SourceFormat::LiveDump).unwrap();
        assert_eq!(once, CANONICAL_20);
        let twice = canonical_string(&once, SourceFormat::LiveDump).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn missing_markers_are_parse_errors() {
        assert_eq!(
            canonicalize("ofctrl_add_flow cookie=1 actions=drop", SourceFormat::DebugLog),
            Err(ParseError::MissingMarker {
                source: SourceFormat::DebugLog,
                marker: "flow:",
            })
        );
        assert_eq!(
            canonicalize("OFPT_FLOW_MOD DELETE table:20 actions=drop", SourceFormat::ProtocolLog),
            Err(ParseError::MissingMarker {
                source: SourceFormat::ProtocolLog,
                marker: " ADD ",
            })
        );
    }

    #[test]
    fn dump_header_line_is_rejected() {
        let err = canonicalize("NXST_FLOW reply (xid=0x4):", SourceFormat::LiveDump).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingActions {
                source: SourceFormat::LiveDump
            }
        );
    }

    #[test]
    fn bad_cookie_is_reported_with_raw_text() {
        let err = canonicalize("flow: cookie=zz, actions=drop", SourceFormat::DebugLog).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                field: "cookie",
                raw: "zz".to_string()
            }
        );
    }
}
