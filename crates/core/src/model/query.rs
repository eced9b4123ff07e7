use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

/// Answer to a free-text question about the uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueryAnswer {
    #[serde(default)]
    pub answer: String,
    pub confidence: Option<Confidence>,
    pub source_chunks: Option<u32>,
}

impl QueryAnswer {
    /// Answer text, annotated with source metadata when the server sent it.
    #[must_use]
    pub fn render(&self) -> String {
        let answer = self.answer.trim();
        if answer.is_empty() {
            return "No response received.".to_owned();
        }

        match (self.confidence, self.source_chunks) {
            (Some(confidence), Some(sources)) => {
                let label = match confidence {
                    Confidence::High => "High confidence",
                    Confidence::Medium => "Medium confidence",
                    Confidence::Low | Confidence::Unknown => "Low confidence",
                };
                let plural = if sources == 1 { "" } else { "s" };
                format!(
                    "{answer}\n\n{label}. Based on {sources} relevant section{plural} from the document."
                )
            }
            _ => answer.to_owned(),
        }
    }
}
