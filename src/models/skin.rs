use serde::{Deserialize, Serialize};

/// Result of a handshake with the skin service.
///
/// `skin_name` is path-like (`"<owner>/<skin>"`); only the segment after the
/// first `/` is used to build the public path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkinSession {
    #[serde(rename = "skinname", alias = "skinName")]
    pub skin_name: String,
}
