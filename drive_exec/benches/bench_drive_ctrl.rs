//! # Drive Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drive_lib::drive_ctrl::{DriveCtrl, Params, SpeedPolicy, Telemetry};

fn drive_ctrl_benchmark(c: &mut Criterion) {
    // A lap's worth of made up telemetry
    let samples: Vec<Telemetry> = (0..1000)
        .map(|i| {
            let t = i as f64 * 0.05;
            Telemetry::new(0.8 * t.sin(), 20.0 + 10.0 * (0.3 * t).cos(), 5.0 * t.cos())
        })
        .collect();

    for &policy in &[SpeedPolicy::SteerMagnitude, SpeedPolicy::ErrorMagnitude] {
        c.bench_function(&format!("drive_ctrl_{:?}", policy), |b| {
            b.iter(|| {
                let mut drive_ctrl = DriveCtrl::new(Params::default()).unwrap();
                for s in samples.iter() {
                    black_box(drive_ctrl.proc_cycle(black_box(s), policy).unwrap());
                }
            })
        });
    }
}

criterion_group!(benches, drive_ctrl_benchmark);
criterion_main!(benches);
