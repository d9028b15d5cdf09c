//! Wire and storage types for the generation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A file the user attached to their prompt. Created client-side, immutable
/// once received, copied verbatim into the persisted conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Client-generated id; collisions are tolerated, it is display-only
    pub id: i64,
    pub name: String,
    /// MIME type string as reported by the browser
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Text content, data URI, or an opaque placeholder for binary types
    pub content: String,
    /// Epoch milliseconds
    pub last_modified: i64,
}

/// One generated source file. The `code`-field shape is the wire contract;
/// a variant that maps paths directly to strings exists in the wild but is
/// deliberately not accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedFile {
    pub code: String,
}

/// Generated project keyed by file path (e.g. `/App.js`). BTreeMap keeps
/// serialization order deterministic.
pub type GeneratedFiles = BTreeMap<String, GeneratedFile>;

/// One persisted generation transaction: the prompt/uploads that produced it
/// and the files it yielded. Write-once; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub uploaded_files: Vec<UploadedFile>,
    #[serde(default)]
    pub generated_files: GeneratedFiles,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /generate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    /// Previously generated files the user wants modified, path -> source
    #[serde(default)]
    pub existing_files: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub uploaded_files: Vec<UploadedFile>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Success body of `POST /generate`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub files: GeneratedFiles,
    pub conversation_id: String,
    pub user_id: String,
}

/// Success body of `GET /generate?userId=`
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub conversations: Vec<Conversation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_wire_names() {
        let body = r#"{
            "prompt": "todo app",
            "existingFiles": {"/App.js": "export default function App() {}"},
            "uploadedFiles": [
                {
                    "id": 1,
                    "name": "notes.txt",
                    "type": "text/plain",
                    "size": 12,
                    "content": "hello world",
                    "lastModified": 1700000000000
                }
            ],
            "userId": "0xabc"
        }"#;

        let req: GenerateRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.prompt.as_deref(), Some("todo app"));
        assert_eq!(req.user_id.as_deref(), Some("0xabc"));
        assert_eq!(req.uploaded_files.len(), 1);
        assert_eq!(req.uploaded_files[0].mime_type, "text/plain");
        assert!(req.existing_files.unwrap().contains_key("/App.js"));
    }

    #[test]
    fn test_generate_request_all_fields_optional_but_user_id_checked_later() {
        // Deserialization itself is lenient; validation happens in the handler
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.prompt.is_none());
        assert!(req.uploaded_files.is_empty());
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_conversation_round_trip() {
        let mut files = GeneratedFiles::new();
        files.insert(
            "/App.js".to_string(),
            GeneratedFile {
                code: "export default function App() {}".to_string(),
            },
        );

        let conv = Conversation {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            prompt: Some("todo app".to_string()),
            uploaded_files: vec![],
            generated_files: files,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&conv).unwrap();
        assert!(json.contains("\"userId\":\"u1\""));
        assert!(json.contains("\"generatedFiles\""));

        let back: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "c1");
        assert_eq!(back.generated_files.len(), 1);
    }

    #[test]
    fn test_generated_file_rejects_bare_string() {
        let result: Result<GeneratedFile, _> = serde_json::from_str("\"just code\"");
        assert!(result.is_err());
    }
}
