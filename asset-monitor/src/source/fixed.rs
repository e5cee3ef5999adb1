use super::ReadingSource;
use crate::error::SourceError;
use crate::types::Reading;

/// Returns the same reading on every call.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub Reading);

impl ReadingSource for FixedSource {
    fn read(&mut self) -> Result<Reading, SourceError> {
        Ok(self.0)
    }
}
