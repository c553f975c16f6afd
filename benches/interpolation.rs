use criterion::{black_box, criterion_group, criterion_main, Criterion};

use almagest::coordinates::{CoordinateFrame, CoordinateFrameOrigin, SphericalCoordinates};
use almagest::interpolation::EphemerisSeries;
use almagest::time::Instant;
use almagest::transform::{table_builder::RotationTableBuilder, FrameTransformer};

/// Ten years of daily samples with three smooth columns.
fn daily_series() -> EphemerisSeries {
    EphemerisSeries::from_rows((0..3653).map(|d| {
        let jd = 2_451_545.0 + d as f64;
        let theta = d as f64 * std::f64::consts::TAU / 365.25;
        (jd, [theta.cos(), theta.sin() * 0.917, theta.sin() * 0.398])
    }))
    .expect("valid series")
}

fn bench_interpolate(c: &mut Criterion) {
    let series = daily_series();
    let instants: Vec<Instant> = (0..1000)
        .map(|i| Instant::from_julian_day(2_451_548.0 + i as f64 * 3.617))
        .collect();

    c.bench_function("interpolation/bessel5_1000_queries", |b| {
        b.iter(|| {
            for at in &instants {
                black_box(series.interpolate(black_box(*at)).expect("in range"));
            }
        })
    });
}

fn bench_transform(c: &mut Criterion) {
    let transformer = FrameTransformer::new(
        RotationTableBuilder::new()
            .start(Instant::from_julian_day(2_451_000.5))
            .end(Instant::from_julian_day(2_453_000.5))
            .build()
            .expect("valid tables"),
    );
    let source = SphericalCoordinates::from_degrees(
        101.287,
        -16.716,
        None,
        CoordinateFrame::icrf(CoordinateFrameOrigin::Geocentric),
    );
    let to = CoordinateFrame::true_ecliptic(
        Instant::from_julian_day(2_452_123.4),
        CoordinateFrameOrigin::Geocentric,
    );

    c.bench_function("transform/icrf_to_true_ecliptic", |b| {
        b.iter(|| black_box(transformer.transform(black_box(&source), &to).expect("in range")))
    });

    c.bench_function("transform/build_rotation_tables_5y", |b| {
        b.iter(|| {
            black_box(
                RotationTableBuilder::new()
                    .start(Instant::from_julian_day(2_451_000.5))
                    .end(Instant::from_julian_day(2_452_826.5))
                    .build()
                    .expect("valid tables"),
            )
        })
    });
}

criterion_group!(benches, bench_interpolate, bench_transform);
criterion_main!(benches);
