use thiserror::Error;

/// Faults raised while turning listing markup into fund records.
///
/// `tile` is the zero-based position of the fund tile in document order.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error("fund tile {tile}: missing {field}")]
    MissingField { tile: usize, field: &'static str },

    #[error("fund tile {tile}: {field} '{value}' is not a number")]
    Parse {
        tile: usize,
        field: &'static str,
        value: String,
    },

    #[error("invalid selector '{selector}': {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}
