use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Template error: {0}")]
    Template(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid glyph key: {0}")]
    InvalidKey(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Nothing to pack")]
    Empty,
    /// The shelf packer grew past the configured ceiling without finding a fit.
    #[error("Atlas capacity exceeded: side {side} is above the limit of {limit}")]
    AtlasCapacity { side: u32, limit: u32 },
    /// Character code allocation ran past 0xFFFF. The font is incomplete and must not be published.
    #[error("Glyph codes exhausted after {assigned} glyphs (codes above 0xFFFF are not allowed)")]
    GlyphCodesExhausted { assigned: usize },
    #[error("Font error: {0}")]
    Font(String),
}

impl From<handlebars::RenderError> for AtlasError {
    fn from(e: handlebars::RenderError) -> Self {
        AtlasError::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for AtlasError {
    fn from(e: handlebars::TemplateError) -> Self {
        AtlasError::Template(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
