use std::path::Path;
use std::sync::Arc;

use crate::config::OcrConfig;
use crate::error::LookupError;
use crate::lookup::{BestEffort, FailureKind};

/// Image-to-text helper. Backed by Tesseract when built with the `ocr`
/// feature; otherwise every call reports [`FailureKind::Unavailable`].
#[derive(Clone)]
pub struct OcrProcessor {
    inner: Arc<OcrProcessorInner>,
}

struct OcrProcessorInner {
    languages: String,
    enabled: bool,
}

impl OcrProcessor {
    pub fn new(config: &OcrConfig) -> Self {
        let lang_str = if config.languages.is_empty() {
            "eng".to_string()
        } else {
            config.languages.join("+")
        };

        Self {
            inner: Arc::new(OcrProcessorInner {
                languages: lang_str,
                enabled: config.enabled,
            }),
        }
    }

    pub fn languages(&self) -> &str {
        &self.inner.languages
    }

    /// True when both compiled in and switched on in the config.
    pub fn is_available(&self) -> bool {
        cfg!(feature = "ocr") && self.inner.enabled
    }

    pub fn extract_file(&self, image_path: &Path) -> BestEffort<String> {
        match std::fs::read(image_path) {
            Ok(bytes) => self.extract_text(&bytes),
            Err(e) => BestEffort::from_result(
                "OCR",
                Err(LookupError::Io {
                    path: image_path.to_path_buf(),
                    source: e,
                }),
            ),
        }
    }

    pub fn extract_text(&self, image_data: &[u8]) -> BestEffort<String> {
        let _span = tracing::info_span!("processor.ocr", bytes = image_data.len()).entered();

        if !self.inner.enabled {
            log::debug!("OCR is disabled in the config");
            return BestEffort::failed(String::new(), FailureKind::Unavailable);
        }

        BestEffort::from_result("OCR", self.run(image_data).map(|text| text.trim().to_string()))
    }

    #[cfg(feature = "ocr")]
    fn run(&self, image_data: &[u8]) -> Result<String, LookupError> {
        use std::io::Cursor;

        let img = image::load_from_memory(image_data)
            .map_err(|e| LookupError::Extraction(format!("Failed to load image: {}", e)))?;

        // leptess wants an encoded image
        let mut png_data = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .map_err(|e| LookupError::Extraction(format!("Failed to convert image: {}", e)))?;

        let mut lt = leptess::LepTess::new(None, &self.inner.languages).map_err(|e| {
            LookupError::Extraction(format!("Failed to initialize Tesseract: {}", e))
        })?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| LookupError::Extraction(format!("Failed to set image for OCR: {}", e)))?;

        lt.get_utf8_text()
            .map_err(|e| LookupError::Extraction(format!("OCR failed: {}", e)))
    }

    #[cfg(not(feature = "ocr"))]
    fn run(&self, _image_data: &[u8]) -> Result<String, LookupError> {
        Err(LookupError::Unavailable("OCR"))
    }
}
