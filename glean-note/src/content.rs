use crate::error::NoteError;
use serde::Deserialize;
use std::path::Path;

/// An article to be saved as a draft.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftContent {
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Accepted for compatibility; uploads are not performed.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Load draft content from a JSON file path, or parse `arg` itself as JSON
/// when no such file exists.
///
/// ```
/// use glean_note::load_content;
///
/// let draft = load_content(r#"{"title": "今日の記録", "body": "本文"}"#).unwrap();
/// assert_eq!(draft.title, "今日の記録");
/// assert!(draft.images.is_empty());
/// ```
pub fn load_content(arg: &str) -> Result<DraftContent, NoteError> {
    let path = Path::new(arg);
    let (text, origin) = if path.is_file() {
        let text = std::fs::read_to_string(path)
            .map_err(|e| NoteError::Content(format!("reading {}: {e}", path.display())))?;
        (text, path.display().to_string())
    } else {
        (arg.to_string(), "inline json".to_string())
    };

    let draft: DraftContent = serde_json::from_str(&text)
        .map_err(|e| NoteError::Content(format!("{origin} is not valid draft json: {e}")))?;
    if draft.title.trim().is_empty() {
        return Err(NoteError::Content(format!("{origin} has an empty title")));
    }
    Ok(draft)
}
