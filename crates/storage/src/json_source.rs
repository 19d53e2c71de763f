use async_trait::async_trait;
use quiz_core::model::QuestionDraft;
use std::path::PathBuf;

use crate::repository::{QuestionSource, StorageError};

/// Question bank stored as a JSON array of `{ "question", "choices", "answer" }` records.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse a question bank from JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the text is not a JSON array of question records.
pub fn parse_questions(raw: &str) -> Result<Vec<QuestionDraft>, StorageError> {
    serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))
}

#[async_trait]
impl QuestionSource for JsonFileSource {
    async fn fetch_questions(&self) -> Result<Vec<QuestionDraft>, StorageError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => {
                    StorageError::NotFound(self.path.display().to_string())
                }
                _ => StorageError::Io(format!("{}: {err}", self.path.display())),
            })?;
        parse_questions(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bank_array() {
        let raw = r#"[
            {"question": "2 + 2?", "choices": ["3", "4"], "answer": ["4"]},
            {"question": "Primes?", "choices": ["2", "4", "5"], "answer": ["2", "5"]}
        ]"#;
        let drafts = parse_questions(raw).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].answer, ["2", "5"]);
    }

    #[test]
    fn rejects_malformed_bank() {
        let err = parse_questions(r#"{"question": "not an array"}"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));

        let err = parse_questions(r#"[{"question": "missing fields"}]"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let source = JsonFileSource::new("/definitely/not/here/questions.json");
        let err = source.fetch_questions().await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            "not found: /definitely/not/here/questions.json"
        );
    }

    #[tokio::test]
    async fn reads_bank_from_file() {
        let path = std::env::temp_dir().join(format!(
            "quiz-bank-{}-{}.json",
            std::process::id(),
            line!()
        ));
        tokio::fs::write(
            &path,
            r#"[{"question": "Capital of France?", "choices": ["Paris", "Rome"], "answer": ["Paris"]}]"#,
        )
        .await
        .unwrap();

        let drafts = JsonFileSource::new(&path).fetch_questions().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].text, "Capital of France?");
        assert_eq!(drafts[0].answer, ["Paris"]);
    }

    #[tokio::test]
    async fn reads_demo_bank() {
        let path =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/questions.json");
        let drafts = JsonFileSource::new(path).fetch_questions().await.unwrap();
        assert!(!drafts.is_empty());
        assert!(drafts.into_iter().all(|draft| draft.validate().is_ok()));
    }
}
