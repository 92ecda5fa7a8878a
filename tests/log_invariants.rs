use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use contestlog::{
    core::{
        log::{LogError, LogSnapshot, QsoLog, SNAPSHOT_FORMAT_VERSION},
        stats::{Rates, band_counts, qso_timestamp, rate_per_hour},
    },
    engine::{DupeKey, is_duplicate},
    qso::{Qso, QsoPatch},
    types::QsoId,
};

const BANDS: [&str; 3] = ["20m", "40m", "80m"];
const MODES: [&str; 2] = ["CW", "SSB"];

#[derive(Debug, Clone)]
enum Action {
    Insert { call_idx: u8, band_idx: u8, mode_idx: u8 },
    PatchCall { target: u8, call_idx: u8 },
    PatchBand { target: u8, band_idx: u8 },
    Remove { target: u8 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..12, 0u8..3, 0u8..2).prop_map(|(call_idx, band_idx, mode_idx)| Action::Insert {
            call_idx,
            band_idx,
            mode_idx
        }),
        (0u8..24, 0u8..12).prop_map(|(target, call_idx)| Action::PatchCall { target, call_idx }),
        (0u8..24, 0u8..3).prop_map(|(target, band_idx)| Action::PatchBand { target, band_idx }),
        (0u8..24).prop_map(|target| Action::Remove { target }),
    ]
}

fn call_of(idx: u8) -> String {
    format!("K{idx}AA")
}

fn qso_at(id: &str, call: &str, band: &str, time: &str) -> Qso {
    Qso::new(id, call, "2024-10-26", time, band)
}

fn pick(log: &QsoLog, target: u8) -> Option<QsoId> {
    let ids = log.ordered_ids();
    if ids.is_empty() {
        return None;
    }
    Some(ids[usize::from(target) % ids.len()].clone())
}

fn full_scan_by_call(log: &QsoLog, call: &str) -> Vec<QsoId> {
    log.iter().filter(|q| q.call == call).map(|q| q.id.clone()).collect()
}

fn by_call_ids(log: &QsoLog, call: &str) -> Vec<QsoId> {
    log.by_call(call).into_iter().map(|q| q.id.clone()).collect()
}

proptest! {
    #[test]
    fn indices_match_full_scans(actions in prop::collection::vec(action_strategy(), 1..200)) {
        let mut log = QsoLog::new();
        let mut calls = BTreeSet::<String>::new();
        let mut next_id = 0u32;

        for action in actions {
            match action {
                Action::Insert { call_idx, band_idx, mode_idx } => {
                    next_id += 1;
                    let call = call_of(call_idx);
                    calls.insert(call.clone());
                    let mut q = qso_at(&next_id.to_string(), &call, BANDS[usize::from(band_idx)], "12:00");
                    q.mode = MODES[usize::from(mode_idx)].to_string();
                    prop_assert!(log.insert(q).is_ok());
                }
                Action::PatchCall { target, call_idx } => {
                    let Some(id) = pick(&log, target) else { continue };
                    let call = call_of(call_idx);
                    calls.insert(call.clone());
                    let patch = QsoPatch { call: Some(call), ..QsoPatch::default() };
                    prop_assert!(log.patch(&id, &patch).is_ok());
                }
                Action::PatchBand { target, band_idx } => {
                    let Some(id) = pick(&log, target) else { continue };
                    let patch = QsoPatch {
                        band: Some(BANDS[usize::from(band_idx)].to_string()),
                        ..QsoPatch::default()
                    };
                    prop_assert!(log.patch(&id, &patch).is_ok());
                }
                Action::Remove { target } => {
                    let Some(id) = pick(&log, target) else { continue };
                    prop_assert!(log.remove(&id).is_ok());
                }
            }

            let records = log.to_vec();
            prop_assert_eq!(records.len(), log.len());
            for call in &calls {
                prop_assert_eq!(by_call_ids(&log, call), full_scan_by_call(&log, call));
                for band in BANDS {
                    for mode in MODES {
                        let mut probe = qso_at("probe", call, band, "12:00");
                        probe.mode = mode.to_string();
                        prop_assert_eq!(log.is_duplicate(&probe), is_duplicate(&probe, &records));
                    }
                }
            }
        }
    }
}

#[test]
fn insert_validates_required_fields_and_ids() {
    let mut log = QsoLog::new();
    assert_eq!(
        log.insert(qso_at("1", "", "20m", "12:00")),
        Err(LogError::MissingField("call"))
    );
    assert_eq!(
        log.insert(qso_at("1", "W1AW", " ", "12:00")),
        Err(LogError::MissingField("band"))
    );

    log.insert(qso_at("1", "W1AW", "20m", "12:00")).expect("insert");
    assert_eq!(
        log.insert(qso_at("1", "K1ABC", "20m", "12:01")),
        Err(LogError::DuplicateId("1".to_string()))
    );
    assert_eq!(log.len(), 1);
}

#[test]
fn update_keeps_position_and_reindexes() {
    let mut log = QsoLog::new();
    for (id, call) in [("a", "W1AW"), ("b", "K1ABC"), ("c", "N3QQ")] {
        log.insert(qso_at(id, call, "20m", "12:00")).expect("insert");
    }

    log.update(qso_at("b", "K1XYZ", "40m", "12:05")).expect("update");
    assert_eq!(log.ordered_ids(), ["a", "b", "c"]);
    assert!(log.by_call("K1ABC").is_empty());
    assert_eq!(log.by_call("K1XYZ").len(), 1);
    assert!(log.contains_key(&DupeKey::new("K1XYZ", "40m", "CW")));
    assert!(!log.contains_key(&DupeKey::new("K1ABC", "20m", "CW")));

    assert_eq!(
        log.update(qso_at("zz", "W1AW", "20m", "12:00")),
        Err(LogError::MissingQso("zz".to_string()))
    );
    assert_eq!(
        log.patch("a", &QsoPatch { call: Some(String::new()), ..QsoPatch::default() }),
        Err(LogError::MissingField("call"))
    );
    assert_eq!(log.get("a").expect("a").call, "W1AW");
}

#[test]
fn remove_returns_record_and_forgets_it() {
    let mut log = QsoLog::new();
    log.insert(qso_at("a", "W1AW", "20m", "12:00")).expect("insert");
    let removed = log.remove("a").expect("remove");
    assert_eq!(removed.call, "W1AW");
    assert!(log.is_empty());
    assert!(!log.is_duplicate(&removed));
    assert_eq!(log.remove("a"), Err(LogError::MissingQso("a".to_string())));
}

#[test]
fn load_is_all_or_nothing() {
    let mut log = QsoLog::new();
    log.insert(qso_at("keep", "W1AW", "20m", "12:00")).expect("insert");

    let bad = vec![
        qso_at("x", "K1ABC", "20m", "12:00"),
        qso_at("x", "K1XYZ", "20m", "12:01"),
    ];
    assert_eq!(log.load(bad), Err(LogError::DuplicateId("x".to_string())));
    assert_eq!(log.ordered_ids(), ["keep"]);

    log.load(vec![qso_at("n", "N3QQ", "40m", "13:00")]).expect("load");
    assert_eq!(log.ordered_ids(), ["n"]);
    assert!(log.get("keep").is_none());
}

#[test]
fn import_skips_bad_records() {
    let mut log = QsoLog::new();
    log.insert(qso_at("a", "W1AW", "20m", "12:00")).expect("insert");

    let added = log.import(vec![
        qso_at("b", "K1ABC", "20m", "12:01"),
        qso_at("c", "K1XYZ", "", "12:02"),
        qso_at("a", "N3QQ", "20m", "12:03"),
        qso_at("d", "N3QQ", "40m", "12:04"),
    ]);
    assert_eq!(added, 2);
    assert_eq!(log.ordered_ids(), ["a", "b", "d"]);

    log.clear();
    assert!(log.is_empty());
    assert!(log.by_call("W1AW").is_empty());
}

#[test]
fn recent_is_oldest_first() {
    let mut log = QsoLog::new();
    for i in 0..5 {
        log.insert(qso_at(&i.to_string(), &call_of(i), "20m", "12:00")).expect("insert");
    }
    let ids: Vec<_> = log.recent(2).into_iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, ["3", "4"]);
    assert_eq!(log.recent(50).len(), 5);
    assert!(log.recent(0).is_empty());
    assert_eq!(log.recent_cloned(1)[0].id, "4");
}

#[test]
fn snapshot_serializes_camel_case_and_restores() {
    let mut log = QsoLog::new();
    let mut q = qso_at("a", "JA1ABC", "20m", "00:01");
    q.serial_sent = Some("1".to_string());
    q.my_grid_square = Some("FN20".to_string());
    log.insert(q).expect("insert");
    log.insert(qso_at("b", "W1AW", "40m", "00:02")).expect("insert");

    let snapshot = log.export_snapshot();
    assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);

    let json = serde_json::to_value(&snapshot).expect("ser");
    assert_eq!(json["formatVersion"], 1);
    let first = &json["qsos"][0];
    assert_eq!(first["rstSent"], "599");
    assert_eq!(first["serialSent"], "1");
    assert_eq!(first["myGridSquare"], "FN20");
    assert!(first.get("comment").is_none());

    let back: LogSnapshot = serde_json::from_value(json).expect("de");
    let restored = QsoLog::from_snapshot(back).expect("restore");
    assert_eq!(restored.to_vec(), log.to_vec());
    assert!(restored.contains_key(&DupeKey::new("W1AW", "40m", "CW")));
}

#[test]
fn rates_and_band_counts() {
    let mut log = QsoLog::new();
    for (i, (time, band)) in [("11:00", "40m"), ("11:55", "20m"), ("11:58", "20m"), ("12:00", "20m")]
        .into_iter()
        .enumerate()
    {
        log.insert(qso_at(&i.to_string(), &call_of(i as u8), band, time)).expect("insert");
    }
    log.insert(Qso::new("bad", "N3QQ", "26/10/2024", "12:00", "80m")).expect("insert");

    let day = NaiveDate::from_ymd_opt(2024, 10, 26).expect("date");
    let now = day.and_hms_opt(12, 0, 0).expect("now");
    let start = day.and_hms_opt(10, 0, 0).expect("start");

    assert_eq!(rate_per_hour(&log, now, 10), 18);
    assert_eq!(rate_per_hour(&log, now, 0), 0);
    assert_eq!(
        Rates::compute(&log, now, Some(start)),
        Rates { last10: 18, last60: 4, total: 2 }
    );
    assert_eq!(Rates::compute(&log, now, None).total, 0);
    assert_eq!(Rates::compute(&log, now, Some(now)).total, 0);

    let counts = band_counts(&log);
    assert_eq!(counts.get("20m"), Some(&3));
    assert_eq!(counts.get("40m"), Some(&1));
    assert_eq!(counts.get("80m"), Some(&1));

    assert_eq!(qso_timestamp(log.get("bad").expect("bad")), None);
}

#[test]
fn total_rate_handles_sub_second_contest() {
    let mut log = QsoLog::new();
    log.insert(qso_at("a", "W1AW", "20m", "12:00")).expect("insert");

    let start = NaiveDate::from_ymd_opt(2024, 10, 26)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("start");
    let now = start + Duration::milliseconds(500);

    let rates = Rates::compute(&log, now, Some(start));
    assert_eq!(rates.total, 7200);
    assert_eq!(Rates::compute(&log, start, Some(now)).total, 0);
}
