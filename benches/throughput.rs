use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use contestlog::{
    adif::{decode_adif, encode_adif},
    core::log::QsoLog,
    engine::{ContestSessionEngine, PrefixMultipliers},
    qso::Qso,
    spot::parse_spot_line,
};

fn qso(i: u64) -> Qso {
    let band = ["20m", "40m", "80m"][(i % 3) as usize];
    Qso::new(i.to_string(), format!("K{}AB", i % 5000), "2024-10-26", "12:00", band)
}

fn bench_log_with_dupe_check(c: &mut Criterion) {
    c.bench_function("log_insert_dupe_check_50k", |b| {
        b.iter(|| {
            let mut log = QsoLog::new();
            let mut engine = ContestSessionEngine::with_rules(PrefixMultipliers::default());
            let _ = engine.start("CQ WPX", "599 + Serial");
            let mut dupes = 0usize;
            for i in 0..50_000u64 {
                let mut q = qso(i);
                if log.is_duplicate(&q) {
                    dupes += 1;
                }
                engine.record_qso(&mut q);
                log.insert(q).expect("insert");
            }
            dupes
        });
    });
}

fn bench_adif(c: &mut Criterion) {
    let mut group = c.benchmark_group("adif");
    for n in [100u64, 10_000u64] {
        let qsos: Vec<Qso> = (0..n).map(qso).collect();
        let text = encode_adif(&qsos);

        group.bench_with_input(BenchmarkId::new("encode", n), &qsos, |b, qsos| {
            b.iter(|| encode_adif(qsos));
        });
        group.bench_with_input(BenchmarkId::new("decode", n), &text, |b, text| {
            b.iter(|| decode_adif(text));
        });
    }
    group.finish();
}

fn bench_spot_lines(c: &mut Criterion) {
    let lines = [
        "DX de W3LPL:     7003.0  JA1ABC       CW up 2                        0430Z",
        "DX de DL8LAS-#:  14040.0  DF2RG        CW    24 dB  28 WPM  CQ      1150Z",
        "To ALL de K1TTT: contest starts soon",
    ];
    c.bench_function("parse_spot_line_mixed", |b| {
        b.iter(|| lines.iter().filter_map(|l| parse_spot_line(l)).count());
    });
}

criterion_group!(benches, bench_log_with_dupe_check, bench_adif, bench_spot_lines);
criterion_main!(benches);
