use thiserror::Error;

pub type HcResult<T> = Result<T, HcError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HcError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}
