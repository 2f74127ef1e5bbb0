use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jet_analysis::{GriddedInput, Hemisphere, JetFindConfig, JetFinder, LevelKind};
use ndarray::Array4;

const N_LEVELS: usize = 21;
const N_LATS: usize = 71;

// Zonally uniform grid with a tanh tropopause putting the jet at 30 degrees.
fn synthetic_input(n_times: usize, n_lons: usize) -> GriddedInput {
    let levels: Vec<f64> = (0..N_LEVELS).map(|k| 300.0 + 5.0 * k as f64).collect();
    let lats: Vec<f64> = (0..N_LATS).map(|i| -87.5 + 2.5 * i as f64).collect();
    let lons: Vec<f64> = (0..n_lons).map(|i| 360.0 * i as f64 / n_lons as f64).collect();

    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let times: Vec<NaiveDateTime> = (0..n_times)
        .map(|i| start + Duration::hours(6 * i as i64))
        .collect();

    let shape = (n_times, N_LEVELS, N_LATS, n_lons);
    let mut ipv = Array4::zeros(shape);
    let mut u_wind = Array4::zeros(shape);

    for t in 0..n_times {
        for (k, &theta) in levels.iter().enumerate() {
            for (y, &lat) in lats.iter().enumerate() {
                let sign = if lat < 0.0 { -1.0 } else { 1.0 };
                let surface = 330.0 + 20.0 * ((lat.abs() - 30.0) / 10.0).tanh();
                let pv = sign * (2.0 + 0.05 * (theta - surface));
                let u = (theta - 300.0) / 5.0
                    * (-((lat.abs() - 30.0) / 15.0).powi(2)).exp();
                for x in 0..n_lons {
                    ipv[[t, k, y, x]] = pv;
                    u_wind[[t, k, y, x]] = u;
                }
            }
        }
    }

    GriddedInput::new(levels, lats, lons, times, LevelKind::PotentialTemperature)
        .with_ipv(ipv)
        .with_u_wind(u_wind)
}

fn jet_finding(c: &mut Criterion) {
    let input = synthetic_input(8, 16);
    let config = JetFindConfig::default();

    c.bench_function("find_jets_both_hemispheres", |b| {
        b.iter(|| {
            let finder = JetFinder::new(&config, &input).unwrap();
            black_box(finder.find_jets())
        });
    });

    c.bench_function("find_northern_hemisphere", |b| {
        let finder = JetFinder::new(&config, &input).unwrap();
        b.iter(|| black_box(finder.find_hemisphere(Hemisphere::Northern)));
    });
}

criterion_group!(benches, jet_finding);
criterion_main!(benches);
