use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("History length {actual} differs from required {expected}")]
    HistoryLength { expected: usize, actual: usize },

    #[error("Field {field} = {value} is not rounded to {decimals} decimal(s)")]
    Unrounded {
        field: &'static str,
        value: f64,
        decimals: i32,
    },

    #[error("Field {field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
