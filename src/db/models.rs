use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Clause {
    #[serde(default)]
    pub clause_type: Option<String>,
    #[serde(default)]
    pub clause_text: String,
}

impl Clause {
    pub fn display_type(&self) -> &str {
        self.clause_type.as_deref().unwrap_or("Uncategorized")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Org,
    Gpe,
    Law,
    Date,
    Other,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self.label.as_str() {
            "PERSON" => EntityKind::Person,
            "ORG" => EntityKind::Org,
            "GPE" => EntityKind::Gpe,
            "LAW" => EntityKind::Law,
            "DATE" => EntityKind::Date,
            _ => EntityKind::Other,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Combined analysis output. Every field defaults to empty when absent.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ResultBundle {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub qa: Vec<QaPair>,
}

impl ResultBundle {
    /// True when there is nothing analysis-derived to render. Q&A alone does not count.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.clauses.is_empty() && self.entities.is_empty()
    }
}

/// `users/{uid}/documents/latest_analysis`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDocument {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub results: Option<ResultBundle>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One record of `users/{uid}/chats/main_chat/messages`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            sender,
            created_at: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TimelineEvent {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// `users/{uid}/timelines/latest_timeline`. Event order is the backend's.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TimelineDocument {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timeline_events: Option<Vec<TimelineEvent>>,
    #[serde(default)]
    pub timeline_summary: Option<String>,
    #[serde(default, rename = "updatedAt", skip_serializing)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_bundle_defaults_missing_fields() {
        let bundle: ResultBundle = serde_json::from_value(json!({ "summary": "s" })).unwrap();
        assert_eq!(bundle.summary, "s");
        assert!(bundle.clauses.is_empty());
        assert!(bundle.qa.is_empty());
    }

    #[test]
    fn test_chat_message_wire_shape() {
        let value = serde_json::to_value(ChatMessage::new(Sender::Bot, "hi")).unwrap();
        assert_eq!(value, json!({ "text": "hi", "sender": "bot" }));
    }

    #[test]
    fn test_analysis_document_reads_store_timestamp() {
        let doc: AnalysisDocument = serde_json::from_value(json!({
            "text": "t",
            "fileName": "brief.txt",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(doc.file_name.as_deref(), Some("brief.txt"));
        assert_eq!(doc.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert!(doc.results.is_none());
    }

    #[test]
    fn test_entity_kind() {
        let e = Entity {
            text: "Judiciary Act of 1789".into(),
            label: "LAW".into(),
        };
        assert_eq!(e.kind(), EntityKind::Law);
        let clause = Clause {
            clause_type: None,
            clause_text: "x".into(),
        };
        assert_eq!(clause.display_type(), "Uncategorized");
    }
}
