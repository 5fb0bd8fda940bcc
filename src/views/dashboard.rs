//! Static model-quality figures shown on the landing page.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPerformancePoint {
    pub month: &'static str,
    pub legal_bert_f1: f32,
    pub t5_summary_rouge: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClauseScore {
    pub clause_type: &'static str,
    pub f1_score: f32,
    /// Bar colour as a hex string.
    pub fill: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatIcon {
    FileJson,
    Scale,
    Server,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub icon: StatIcon,
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const MODEL_PERFORMANCE: &[ModelPerformancePoint] = &[
    ModelPerformancePoint { month: "Jan", legal_bert_f1: 0.88, t5_summary_rouge: 0.75 },
    ModelPerformancePoint { month: "Feb", legal_bert_f1: 0.89, t5_summary_rouge: 0.76 },
    ModelPerformancePoint { month: "Mar", legal_bert_f1: 0.91, t5_summary_rouge: 0.78 },
    ModelPerformancePoint { month: "Apr", legal_bert_f1: 0.90, t5_summary_rouge: 0.77 },
    ModelPerformancePoint { month: "May", legal_bert_f1: 0.92, t5_summary_rouge: 0.80 },
    ModelPerformancePoint { month: "Jun", legal_bert_f1: 0.93, t5_summary_rouge: 0.81 },
];

pub const CLAUSE_EXTRACTION: &[ClauseScore] = &[
    ClauseScore { clause_type: "Obligation", f1_score: 0.94, fill: "#8884d8" },
    ClauseScore { clause_type: "Liability", f1_score: 0.91, fill: "#82ca9d" },
    ClauseScore { clause_type: "Termination", f1_score: 0.95, fill: "#ffc658" },
    ClauseScore { clause_type: "Confidentiality", f1_score: 0.96, fill: "#ff8042" },
];

pub const STATS: &[StatCard] = &[
    StatCard {
        icon: StatIcon::FileJson,
        value: "94.8%",
        label: "Clause Extraction F1",
        description: "Average across all categories",
    },
    StatCard {
        icon: StatIcon::Scale,
        value: "81.2%",
        label: "Summarization ROUGE-L",
        description: "On case law documents",
    },
    StatCard {
        icon: StatIcon::Server,
        value: "99.5%",
        label: "Model API Uptime",
        description: "Last 30 days",
    },
    StatCard {
        icon: StatIcon::Bot,
        value: "92.3%",
        label: "Q&A Accuracy (RAG)",
        description: "On uploaded document context",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: &'static [StatCard],
    pub model_performance: &'static [ModelPerformancePoint],
    pub clause_extraction: &'static [ClauseScore],
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            stats: STATS,
            model_performance: MODEL_PERFORMANCE,
            clause_extraction: CLAUSE_EXTRACTION,
        }
    }
}
