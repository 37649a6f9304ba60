use serde::{Deserialize, Serialize};

/// Width assumed for slides whose dimensions were lost.
pub const DEFAULT_SLIDE_WIDTH: u32 = 800;
/// Height assumed for slides whose dimensions were lost.
pub const DEFAULT_SLIDE_HEIGHT: u32 = 600;

/// One imported document page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    /// Zero-based position in the source document
    pub index: usize,
    /// Rendered page image, encoded as text (usually a data URL)
    pub image_data: String,
    pub width: u32,
    pub height: u32,
    /// Text layer extracted from the page, if the document had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}
