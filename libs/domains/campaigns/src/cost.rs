use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Characters per billing segment.
pub const SEGMENT_SIZE: u32 = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub characters: u32,
    pub segments: u32,
    pub estimated_cost: u64,
}

/// Segment-based cost of sending `message` to `recipients` numbers.
///
/// Characters are UTF-16 code units of the trimmed message, so characters
/// outside the BMP count twice. An empty message costs nothing.
pub fn estimate_cost(message: &str, recipients: usize) -> CostEstimate {
    let characters = message.trim().encode_utf16().count() as u32;
    let segments = characters.div_ceil(SEGMENT_SIZE);

    CostEstimate {
        characters,
        segments,
        estimated_cost: u64::from(segments) * recipients as u64,
    }
}
