//! Classifier that reads detector output written next to the image
//!
//! The external detector writes `<image>.detections.json`:
//! `{"hazards": [Finding, ...], "signage": [Finding, ...]}`

use roadwatch_core::{Category, Classifier, ClassifierError, Finding, FindingSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct SidecarFile {
    #[serde(default)]
    hazards: Vec<Finding>,
    #[serde(default, alias = "signs")]
    signage: Vec<Finding>,
}

pub struct SidecarClassifier {
    detections: Option<PathBuf>,
}

impl SidecarClassifier {
    /// Use `detections` when given, else the file next to each image
    pub fn new(detections: Option<PathBuf>) -> Self {
        Self { detections }
    }

    fn sidecar_path(&self, image_reference: &str) -> PathBuf {
        self.detections
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.detections.json", image_reference)))
    }
}

impl Classifier for SidecarClassifier {
    fn detect(
        &self,
        image_reference: &str,
        category: Category,
    ) -> Result<FindingSet, ClassifierError> {
        let image = Path::new(image_reference);
        std::fs::File::open(image)
            .map_err(|e| ClassifierError::Unreadable(format!("{}: {}", image.display(), e)))?;

        let path = self.sidecar_path(image_reference);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            ClassifierError::Model(format!("no detector output at {}: {}", path.display(), e))
        })?;
        let sidecar: SidecarFile = serde_json::from_str(&contents)
            .map_err(|e| ClassifierError::Model(format!("{}: {}", path.display(), e)))?;

        let findings = match category {
            Category::Hazard => sidecar.hazards,
            Category::Signage => sidecar.signage,
        };
        Ok(FindingSet::new(category, findings))
    }
}
