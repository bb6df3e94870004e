//! Request bodies.

use serde::{Deserialize, Serialize};

/// `POST /api/dice-sets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDiceSetRequest {
    pub name: String,
}

/// `PUT /api/dice-sets/{id}/dice/{kind}/faces/{index}`
///
/// `value` is the raw text of the count field. It is parsed server-side so
/// that an empty field means 0 and a negative or non-numeric entry is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceInputRequest {
    pub value: String,
}

/// `POST /api/dice-sets/{id}/dice/{kind}/pin`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PinFaceRequest {
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_input_keeps_raw_text() {
        let req: FaceInputRequest = serde_json::from_str(r#"{"value":"-1"}"#).unwrap();
        assert_eq!(req.value, "-1");
    }

    #[test]
    fn pin_face_parses_index() {
        let req: PinFaceRequest = serde_json::from_str(r#"{"index":5}"#).unwrap();
        assert_eq!(req.index, 5);
    }
}
