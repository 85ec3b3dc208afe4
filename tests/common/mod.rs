#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use uuid::Uuid;

/// Fresh directory under the system temp dir, removed on drop.
pub struct TempRoot {
    pub path: Utf8PathBuf,
}

impl TempRoot {
    pub fn new() -> Self {
        let base = Utf8PathBuf::from_path_buf(std::env::temp_dir()).expect("utf-8 temp dir");
        let path = base.join(format!("pedtraj-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        TempRoot { path }
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Write a raw trajectory file: one `frame<TAB>ped<TAB>y<TAB>x` line per row.
pub fn write_raw_file(path: &Utf8Path, rows: &[(i64, i64, &str, &str)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let content: String = rows
        .iter()
        .map(|(f, p, y, x)| format!("{f}\t{p}\t{y}\t{x}\n"))
        .collect();
    std::fs::write(path, content).unwrap();
}

/// `n_frames` frames numbered from `first_frame`, two agents per frame.
/// Agent `base_id` moves along x, agent `base_id + 1` along y.
pub fn two_walkers(n_frames: i64, first_frame: i64, base_id: i64) -> Vec<(i64, i64, String, String)> {
    (0..n_frames)
        .flat_map(|k| {
            let f = first_frame + k;
            let step = format!("{:.2}", 0.1 * k as f64);
            [
                (f, base_id, "0.00".to_string(), step.clone()),
                (f, base_id + 1, step, "1.00".to_string()),
            ]
        })
        .collect()
}

/// Write a file produced by [`two_walkers`].
pub fn write_walkers(path: &Utf8Path, n_frames: i64, first_frame: i64, base_id: i64) {
    let rows = two_walkers(n_frames, first_frame, base_id);
    let borrowed: Vec<(i64, i64, &str, &str)> = rows
        .iter()
        .map(|(f, p, y, x)| (*f, *p, y.as_str(), x.as_str()))
        .collect();
    write_raw_file(path, &borrowed);
}
