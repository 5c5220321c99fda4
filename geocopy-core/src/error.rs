use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoCopyError {
    /// Text did not match any recognized geometry keyword/body pattern.
    #[error("unrecognized geometry text: {0}")]
    MalformedInput(String),

    /// Kind recognized, but the fast path has no encoder for it.
    #[error("no fast-path encoder for {0}")]
    UnsupportedKind(&'static str),

    /// A coordinate token is not a valid floating-point literal.
    #[error("invalid coordinate literal: {0}")]
    NumericParse(#[from] std::num::ParseFloatError),

    /// The `GEOMETRYCOLLECTION` nesting guard tripped.
    #[error("geometry collections nested deeper than {max} levels")]
    TooDeeplyNested { max: usize },

    #[error("invalid EWKB: {0}")]
    InvalidEwkb(&'static str),

    /// The geozero fallback itself could not parse or encode the text.
    #[error("fallback conversion failed: {0}")]
    Fallback(#[from] geozero::error::GeozeroError),
}

impl GeoCopyError {
    /// Whether the conversion may be retried through the fallback converter.
    ///
    /// The fast path is an optimization, never a correctness gate: parse
    /// failures route the original text to geozero instead of surfacing.
    /// Nesting-depth violations and fallback failures stay fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeoCopyError::MalformedInput(_)
                | GeoCopyError::UnsupportedKind(_)
                | GeoCopyError::NumericParse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GeoCopyError>;
