//! Temporary workspaces holding instance files for CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Hub with one delivery ten units away.
pub(super) const SINGLE_DELIVERY: &str = r#"{
  "mapa": {
    "vertices": [
      {"id": "HUB", "tipo": "HUB", "x": 0, "y": 0},
      {"id": "D1", "tipo": "punto_entrega", "x": 10, "y": 0}
    ],
    "rutas": [
      {"p1": "HUB", "p2": "D1", "peso": {"distancia": 10, "riesgo": 0.2, "consumo": 10}}
    ],
    "no_fly": []
  }
}"#;

/// Delivery whose only edge crosses a no-fly square.
pub(super) const BLOCKED_DELIVERY: &str = r#"{
  "mapa": {
    "vertices": [
      {"id": "HUB", "tipo": "HUB", "x": 0, "y": 0},
      {"id": "D1", "tipo": "punto_entrega", "x": 10, "y": 0}
    ],
    "rutas": [
      {"p1": "HUB", "p2": "D1", "peso": {"distancia": 10, "riesgo": 0.2, "consumo": 10}}
    ],
    "no_fly": [
      {"poligono": [{"x": 4, "y": -1}, {"x": 6, "y": -1}, {"x": 6, "y": 1}, {"x": 4, "y": 1}]}
    ]
  }
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write fixture file");
}

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}
