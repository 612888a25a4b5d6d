use std::fmt;

use super::types::{FullSchema, Segment};

/// A segment scheduled for emission has no schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSchemaError {
    pub segment_name: String,
}

impl fmt::Display for MissingSchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Schema is missing for segment \"{}\". Make sure the segment is registered and exports its controllers.",
            self.segment_name
        )
    }
}

impl std::error::Error for MissingSchemaError {}

/// Build the schema for exactly `segments`, keyed and ordered by segment name.
///
/// Fails on the first segment without an entry in `schema`.
pub fn assemble_schema(
    segments: &[Segment],
    schema: &FullSchema,
) -> Result<FullSchema, MissingSchemaError> {
    let mut assembled = FullSchema::new();
    for segment in segments {
        let entry = schema
            .get(&segment.segment_name)
            .ok_or_else(|| MissingSchemaError {
                segment_name: segment.segment_name.clone(),
            })?;
        let mut entry = entry.clone();
        entry.segment_name = segment.segment_name.clone();
        assembled.insert(entry);
    }
    Ok(assembled)
}
