//! Shared test utilities for stitchsort integration tests.
//!
//! Provides synthetic design files and classifier doubles so batches run
//! without touching the network.

use std::path::Path;
use std::sync::Mutex;

use stitchsort::{Category, Classifier};

/// Writes a syntactically valid design file with a small stitch run.
pub fn write_design(directory: &Path, name: &str) {
    std::fs::write(directory.join(name), valid_design_bytes()).unwrap();
}

/// Writes a design whose stitch block ends immediately, so rendering
/// fails with an empty-design error.
pub fn write_stitchless_design(directory: &Path, name: &str) {
    std::fs::write(directory.join(name), design_bytes(&[0xFF, 0x00])).unwrap();
}

pub fn valid_design_bytes() -> Vec<u8> {
    design_bytes(&[
        0, 0, // anchor at origin
        20, 0, // stitch right
        0, 20, // stitch down
        0xFF, 0x00,
    ])
}

/// Assembles file bytes around the given stitch block: magic, the
/// stitch section position, and the fixed-size header before stitches.
pub fn design_bytes(stitch_block: &[u8]) -> Vec<u8> {
    let pec_position = 16usize;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"#PES0001");
    bytes.extend_from_slice(&(pec_position as u32).to_le_bytes());
    bytes.resize(pec_position + 532, 0);
    bytes.extend_from_slice(stitch_block);
    bytes
}

/// Classifier double returning one fixed category for every image.
pub struct StaticClassifier {
    category: &'static str,
}

impl StaticClassifier {
    pub fn new(category: &'static str) -> Self {
        Self { category }
    }
}

impl Classifier for StaticClassifier {
    fn classify(&self, _image_path: &Path) -> Category {
        Category::new(self.category, 1.0).unwrap()
    }

    fn available(&self) -> bool {
        true
    }
}

/// Classifier double that reports the backend as unreachable.
pub struct UnavailableClassifier;

impl Classifier for UnavailableClassifier {
    fn classify(&self, _image_path: &Path) -> Category {
        Category::other()
    }

    fn available(&self) -> bool {
        false
    }
}

/// Classifier double returning scripted categories in call order,
/// repeating the last one once the script runs out.
pub struct ScriptedClassifier {
    script: Mutex<Vec<&'static str>>,
    fallback: &'static str,
}

impl ScriptedClassifier {
    pub fn new(script: Vec<&'static str>) -> Self {
        Self {
            script: Mutex::new(script),
            fallback: "other",
        }
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, _image_path: &Path) -> Category {
        let mut script = self.script.lock().unwrap();
        let name = if script.is_empty() {
            self.fallback
        } else {
            script.remove(0)
        };
        Category::new(name, 1.0).unwrap()
    }

    fn available(&self) -> bool {
        true
    }
}
