use criterion::{black_box, criterion_group, criterion_main, Criterion};
use radeon_adl::ffi::{ADLPMLogDataOutput, ADLSingleSensorData};
use radeon_adl::{AdlStatus, PmLogSnapshot, SensorType};

pub fn bench_status_decode(c: &mut Criterion) {
    c.bench_function("status_from_raw", |b| {
        b.iter(|| (-40..=5).map(|code| AdlStatus::from(black_box(code))).filter(|s| s.is_ok()).count())
    });
}

pub fn bench_pmlog_decode(c: &mut Criterion) {
    let mut output = ADLPMLogDataOutput::default();
    for sensor in SensorType::ALL {
        output.sensors[sensor.id()] = ADLSingleSensorData { supported: 1, value: sensor.id() as i32 * 10 };
    }

    c.bench_function("pmlog_snapshot", |b| {
        b.iter(|| PmLogSnapshot::from_output(black_box(&output)).readings())
    });
}

criterion_group!(benches, bench_status_decode, bench_pmlog_decode);
criterion_main!(benches);
