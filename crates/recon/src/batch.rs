use crate::error::ReconError;

/// Split `records` into contiguous chunks of `size`, the last one holding
/// the remainder. Empty input yields no chunks.
pub fn chunk<T>(records: &[T], size: usize) -> Result<Vec<&[T]>, ReconError> {
    if size == 0 {
        return Err(ReconError::Configuration(
            "batch size must be at least 1".into(),
        ));
    }
    Ok(records.chunks(size).collect())
}
