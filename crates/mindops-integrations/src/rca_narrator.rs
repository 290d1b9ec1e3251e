//! LLM-backed RCA narration capability. No LLM client is wired into this
//! workspace, so only the always-present template fallback exists; the
//! trait boundary is kept so a real backend can be added without touching
//! callers.

use crate::health::AdapterHealth;
use async_trait::async_trait;
use mindops_topology::RcaHint;

#[async_trait]
pub trait RcaNarrator: Send + Sync {
    fn name(&self) -> &str;
    async fn probe(&self) -> AdapterHealth;
    async fn narrate(&self, hints: &[RcaHint]) -> String;
}

/// Renders a deterministic, human-readable summary from RCA hint scores
/// without calling out to a language model.
#[derive(Debug, Default)]
pub struct TemplateRcaNarrator;

#[async_trait]
impl RcaNarrator for TemplateRcaNarrator {
    fn name(&self) -> &str {
        "template"
    }

    async fn probe(&self) -> AdapterHealth {
        AdapterHealth::ready()
    }

    async fn narrate(&self, hints: &[RcaHint]) -> String {
        if hints.is_empty() {
            return "No RCA hints were raised; no service exceeded the error or centrality thresholds.".to_string();
        }
        let mut lines = vec![format!("{} service(s) flagged for investigation:", hints.len())];
        for hint in hints {
            lines.push(format!(
                "- {} (score {:.2}): error_rate={:.2}%, pagerank={:.2} — {}",
                hint.service,
                hint.score,
                hint.error_rate * 100.0,
                hint.pagerank,
                hint.notes.join("; ")
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_hints_produce_a_clean_bill_of_health() {
        let narrator = TemplateRcaNarrator;
        let text = narrator.narrate(&[]).await;
        assert!(text.contains("No RCA hints"));
        assert!(narrator.probe().await.ready);
    }

    #[tokio::test]
    async fn hints_are_rendered_with_their_service_name() {
        let narrator = TemplateRcaNarrator;
        let hints = vec![RcaHint {
            node_id: "default/db".to_string(),
            service: "db".to_string(),
            score: 0.65,
            error_rate: 0.5,
            pagerank: 0.6,
            notes: vec!["Error rate 50.00% exceeds threshold.".to_string()],
        }];
        let text = narrator.narrate(&hints).await;
        assert!(text.contains("db"));
        assert!(text.contains("0.65"));
    }
}
