use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// A table was kept (or skipped) although its row widths disagree.
    LowConfidence,
    /// The header guess for a table was a close call.
    HeaderInferenceLowConfidence,
    /// Per-page text held no table, the whole-document text did.
    DocumentTextFallback,
}

impl WarningCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowConfidence => "low_confidence",
            Self::HeaderInferenceLowConfidence => "header_inference_low_confidence",
            Self::DocumentTextFallback => "document_text_fallback",
        }
    }
}

/// A non-fatal observation made while detecting tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractWarning {
    pub code: WarningCode,
    pub message: String,
    pub page: Option<u32>,
    pub table_id: Option<usize>,
    pub confidence: Option<f32>,
}

impl ExtractWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            page: None,
            table_id: None,
            confidence: None,
        }
    }

    #[must_use]
    pub fn with_page(self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self
        }
    }

    #[must_use]
    pub fn with_table_id(self, table_id: usize) -> Self {
        Self {
            table_id: Some(table_id),
            ..self
        }
    }

    #[must_use]
    pub fn with_confidence(self, confidence: f32) -> Self {
        Self {
            confidence: Some(confidence),
            ..self
        }
    }

    /// Emits the warning as a `tracing` event.
    pub fn log(&self) {
        tracing::warn!(
            code = self.code.as_str(),
            page = self.page,
            table_id = self.table_id,
            confidence = self.confidence,
            "{}",
            self.message
        );
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code.as_str())?;
        if let Some(page) = self.page {
            write!(f, " page {page}")?;
        }
        if let Some(table_id) = self.table_id {
            write!(f, " table {table_id}")?;
        }
        if let Some(confidence) = self.confidence {
            write!(f, " confidence {confidence:.2}")?;
        }
        write!(f, ": {}", self.message)
    }
}
