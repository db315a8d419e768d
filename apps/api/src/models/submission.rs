use serde::{Deserialize, Serialize};

/// One student's uploaded assignment plus the text extracted from it.
///
/// Field names on disk follow the persisted collection format
/// (`pdf_path` / `stitched_path`), so existing stores load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub roll_no: String,
    pub name: String,
    #[serde(rename = "pdf_path")]
    pub source_path: String,
    #[serde(rename = "stitched_path")]
    pub rendered_path: String,
    pub extracted_text: String,
}

impl Submission {
    /// Text length in characters, the unit the comparability minimum is measured in.
    pub fn text_len(&self) -> usize {
        self.extracted_text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_with_persisted_field_names() {
        let submission = Submission {
            roll_no: "21CS042".to_string(),
            name: "Asha".to_string(),
            source_path: "uploads/21CS042_essay.pdf".to_string(),
            rendered_path: "stitched/21CS042_stitched.png".to_string(),
            extracted_text: "Bonjour à tous.".to_string(),
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            value,
            json!({
                "roll_no": "21CS042",
                "name": "Asha",
                "pdf_path": "uploads/21CS042_essay.pdf",
                "stitched_path": "stitched/21CS042_stitched.png",
                "extracted_text": "Bonjour à tous."
            })
        );
    }

    #[test]
    fn test_text_len_counts_characters_not_bytes() {
        let submission = Submission {
            roll_no: "1".to_string(),
            name: "n".to_string(),
            source_path: String::new(),
            rendered_path: String::new(),
            extracted_text: "héllo".to_string(),
        };
        assert_eq!(submission.text_len(), 5);
    }
}
