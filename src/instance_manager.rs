//! Thread-safe pooling of Tesseract instances.
//!
//! Creating a Tesseract instance loads language data from disk and takes
//! hundreds of milliseconds; one instance per language configuration is kept
//! alive for the process lifetime and reused across requests.

use leptess::LepTess;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ocr_config::OcrConfig;

/// Pool of Tesseract OCR instances keyed by language configuration.
pub struct OcrInstanceManager {
    instances: Mutex<HashMap<String, Arc<Mutex<LepTess>>>>,
}

impl OcrInstanceManager {
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create an instance for the given configuration.
    ///
    /// The first call for a language combination initializes Tesseract and
    /// applies the fixed page segmentation mode; later calls only clone the
    /// `Arc`. Fails when the language packs are missing.
    pub fn get_instance(&self, config: &OcrConfig) -> anyhow::Result<Arc<Mutex<LepTess>>> {
        let key = config.languages.clone();

        {
            let instances = self.instances.lock().unwrap();
            if let Some(instance) = instances.get(&key) {
                return Ok(Arc::clone(instance));
            }
        }

        log::info!("Creating new OCR instance for languages: {key}");
        let mut tess = LepTess::new(None, &key)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Tesseract OCR instance: {}", e))?;
        tess.set_variable(
            leptess::Variable::TesseditPagesegMode,
            &config.page_seg_mode.to_string(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to set page segmentation mode: {}", e))?;

        let instance = Arc::new(Mutex::new(tess));

        {
            let mut instances = self.instances.lock().unwrap();
            instances.insert(key, Arc::clone(&instance));
        }

        Ok(instance)
    }

    /// Number of pooled instances.
    pub fn instance_count(&self) -> usize {
        self.instances.lock().unwrap().len()
    }
}

impl Default for OcrInstanceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_starts_empty() {
        let manager = OcrInstanceManager::new();
        assert_eq!(manager.instance_count(), 0);
    }
}
