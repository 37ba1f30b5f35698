#![allow(dead_code)]
use camino::{Utf8Path, Utf8PathBuf};
use eddynet::observations::{write_parquet, Column, FieldEntry, Observations, Packing};
use tracing_subscriber::EnvFilter;

/// Route `tracing` events to the test output, filtered by `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Closed square contour, counter-clockwise from its lower left corner.
pub fn square(x0: f32, y0: f32, side: f32) -> (Vec<f32>, Vec<f32>) {
    (
        vec![x0, x0 + side, x0 + side, x0],
        vec![y0, y0, y0 + side, y0 + side],
    )
}

/// One timestep of 2x2 square eddies with lower left corners `origins`.
///
/// Fields: `time` (`u32`), `amplitude` (packed `u16`), effective and speed contours.
pub fn day(time: u32, origins: &[(f32, f32)]) -> Observations {
    let (x, y): (Vec<_>, Vec<_>) = origins.iter().map(|&(x0, y0)| square(x0, y0, 2.0)).unzip();
    let (xs, ys): (Vec<_>, Vec<_>) = origins
        .iter()
        .map(|&(x0, y0)| square(x0 + 0.5, y0 + 0.5, 1.0))
        .unzip();
    let amplitude = (0..origins.len()).map(|k| 100 * time as u16 + k as u16).collect();

    Observations::from_fields(
        vec![
            FieldEntry::new("time", Column::U32(vec![time; origins.len()]), None),
            FieldEntry::new(
                "amplitude",
                Column::U16(amplitude),
                Some(Packing::new(0.001, 0.0)),
            ),
            FieldEntry::new("contour_lon_e", Column::F32List(x), None),
            FieldEntry::new("contour_lat_e", Column::F32List(y), None),
            FieldEntry::new("contour_lon_s", Column::F32List(xs), None),
            FieldEntry::new("contour_lat_s", Column::F32List(ys), None),
        ],
        Some(1),
    )
    .unwrap()
}

/// Write one Parquet file per day, named `Anticyclonic_2020MMDD.parquet`.
pub fn write_days(dir: &Utf8Path, days: &[Observations]) -> Vec<Utf8PathBuf> {
    days.iter()
        .enumerate()
        .map(|(k, obs)| {
            let path = dir.join(format!("Anticyclonic_202001{:02}.parquet", k + 1));
            write_parquet(obs, &path).unwrap();
            path
        })
        .collect()
}

pub fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}
