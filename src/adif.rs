//! ADIF (`.adi`) export and best-effort import.
//!
//! Export writes a fixed header followed by one `<EOR>`-terminated record per QSO. Import never
//! fails as a whole: records missing a call, date, or time are dropped one by one.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::{band::band_for_frequency, qso::Qso};

/// Header written ahead of the first record, `<EOH>` included.
pub const ADIF_HEADER: &str = "ADIF Export from CW Contest Logger\n\
<PROGRAMID:17>CW Contest Logger\n\
<PROGRAMVERSION:3>1.0\n\
<EOH>\n\n";

/// Mode written for every record. The logger is CW-only, so the stored mode is not exported.
pub const EXPORT_MODE: &str = "CW";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<([a-z_]+):(\d+)(?::[a-z])?>").expect("static ADIF tag pattern")
});

static EOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<eor>").expect("static ADIF record pattern"));

static EOH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<eoh>").expect("static ADIF header pattern"));

/// Serializes `qsos` to ADIF text in log order.
pub fn encode_adif(qsos: &[Qso]) -> String {
    let mut out = String::with_capacity(ADIF_HEADER.len() + qsos.len() * 160);
    out.push_str(ADIF_HEADER);

    for qso in qsos {
        push_field(&mut out, "CALL", &qso.call);
        push_field(&mut out, "QSO_DATE", &qso.date.replace('-', ""));
        push_field(&mut out, "TIME_ON", &encode_time(&qso.time));
        push_field(&mut out, "BAND", &qso.band);
        push_field(&mut out, "MODE", EXPORT_MODE);
        push_field(&mut out, "RST_SENT", &qso.rst_sent);
        push_field(&mut out, "RST_RCVD", &qso.rst_rcvd);
        push_optional(&mut out, "STX", qso.serial_sent.as_deref());
        push_optional(&mut out, "SRX", qso.serial_rcvd.as_deref());
        push_optional(&mut out, "MY_GRIDSQUARE", qso.my_grid_square.as_deref());
        push_optional(&mut out, "GRIDSQUARE", qso.grid_square.as_deref());
        push_optional(&mut out, "COMMENT", qso.comment.as_deref());
        out.push_str("<EOR>\n\n");
    }

    out
}

fn push_field(out: &mut String, tag: &str, value: &str) {
    out.push('<');
    out.push_str(tag);
    out.push(':');
    out.push_str(&value.chars().count().to_string());
    out.push('>');
    out.push_str(value);
}

fn push_optional(out: &mut String, tag: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        push_field(out, tag, v);
    }
}

// Always the 4-digit HHMM form; seconds are never written.
fn encode_time(time: &str) -> String {
    time.replace(':', "").chars().take(4).collect()
}

/// Parses ADIF text into QSOs, skipping the header and any incomplete record.
///
/// Each accepted record gets a fresh id, one point, and no multiplier flag. Ids present in the
/// source text are ignored.
pub fn decode_adif(text: &str) -> Vec<Qso> {
    let body = match EOH_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };

    let mut out = Vec::new();
    let mut dropped = 0usize;

    for chunk in EOR_RE.split(body) {
        if chunk.trim().is_empty() || EOH_RE.is_match(chunk) {
            continue;
        }
        match decode_record(chunk) {
            Some(qso) => out.push(qso),
            None => {
                dropped += 1;
                debug!(chunk = chunk.trim(), "dropping ADIF record without call/date/time");
            }
        }
    }

    debug!(accepted = out.len(), dropped, "decoded ADIF text");
    out
}

fn decode_record(chunk: &str) -> Option<Qso> {
    let mut qso = Qso::new(Uuid::now_v7().to_string(), "", "", "", "");

    let mut pos = 0;
    while let Some(cap) = TAG_RE.captures_at(chunk, pos) {
        let Some(tag) = cap.get(0) else { break };
        let name = cap[1].to_ascii_lowercase();
        let declared: usize = cap[2].parse().unwrap_or(usize::MAX);
        let (value, end) = field_value(chunk, tag.end(), declared);
        pos = end;

        match name.as_str() {
            "call" => qso.call = value,
            "qso_date" => {
                if let Some(date) = decode_date(&value) {
                    qso.date = date;
                }
            }
            "time_on" => {
                if let Some(time) = decode_time(&value) {
                    qso.time = time;
                }
            }
            "band" => qso.band = value,
            "freq" => qso.frequency = value.trim().parse().ok(),
            "mode" => qso.mode = value,
            "rst_sent" => qso.rst_sent = value,
            "rst_rcvd" => qso.rst_rcvd = value,
            "stx" => qso.serial_sent = non_empty(value),
            "srx" => qso.serial_rcvd = non_empty(value),
            "my_gridsquare" => qso.my_grid_square = non_empty(value),
            "gridsquare" => qso.grid_square = non_empty(value),
            "comment" => qso.comment = non_empty(value),
            "dxcc" => qso.dxcc = value.trim().parse().ok(),
            "cqz" => qso.cq_zone = value.trim().parse().ok(),
            "ituz" => qso.itu_zone = value.trim().parse().ok(),
            _ => {}
        }
    }

    if qso.band.is_empty() {
        if let Some(band) = qso.frequency.and_then(band_for_frequency) {
            qso.band = band.as_str().to_string();
        }
    }

    if qso.call.is_empty() || qso.date.is_empty() || qso.time.is_empty() {
        return None;
    }
    Some(qso)
}

// Returns the value starting at `start` and the offset just past it.
//
// The declared length wins when it fits before the next `<`, or when the text it covers is
// followed by the end of the record or another tag (a value containing `<`). Otherwise the
// length is wrong and the value runs to the next `<` minus trailing line breaks.
fn field_value(chunk: &str, start: usize, declared: usize) -> (String, usize) {
    let rest = &chunk[start..];
    let raw_len = rest.find('<').unwrap_or(rest.len());

    let by_length = rest
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(rest.len()))
        .nth(declared);
    if let Some(len) = by_length {
        if len <= raw_len || ends_field(chunk, start + len) {
            return (rest[..len].to_string(), start + len);
        }
    }

    let raw = rest[..raw_len].trim_end_matches(['\r', '\n']);
    (raw.to_string(), start + raw_len)
}

fn ends_field(chunk: &str, at: usize) -> bool {
    let tail = &chunk[at..];
    let next = at + (tail.len() - tail.trim_start().len());
    next == chunk.len() || TAG_RE.find_at(chunk, next).is_some_and(|m| m.start() == next)
}

fn decode_date(value: &str) -> Option<String> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}-{}", &value[..4], &value[4..6], &value[6..]))
}

fn decode_time(value: &str) -> Option<String> {
    if !matches!(value.len(), 4 | 6) || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}:{}", &value[..2], &value[2..4]))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
