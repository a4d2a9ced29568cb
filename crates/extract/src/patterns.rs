//! Integration pattern detection.
//!
//! Two layers: cheap keyword heuristics over the extracted components, and
//! an optional model pass for a richer read of how the systems connect.
//! The heuristics never touch the network and back the tests.

use std::fmt;
use std::sync::LazyLock;

use dsd_core::{extract_json_block, Error, Result, SystemComponent};
use regex::Regex;
use serde::Deserialize;

use crate::client::ClaudeClient;

static JSON_OBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

const PATTERNS_PROMPT: &str = r#"You are an integration architecture expert. Analyze these system components and identify the integration patterns connecting them.

COMPONENTS:
{components_info}

For the current landscape, identify:
1. Legacy integration patterns in use (ESB, point-to-point, batch file transfer, ...)
2. Modern patterns that would improve the architecture (API gateway, event streaming, service mesh, ...)

Return your analysis as JSON:
{
    "current_patterns": [
        {
            "pattern_type": "one of: enterprise_service_bus, point_to_point, batch_transfer, api_gateway, event_streaming, service_mesh",
            "description": "what this pattern does here",
            "systems_involved": ["System A", "System B"]
        }
    ],
    "recommended_patterns": [
        {
            "pattern_type": "pattern type",
            "description": "why this pattern fits",
            "systems_involved": ["System A"]
        }
    ],
    "summary": "one paragraph overview"
}

Return ONLY the JSON, no other text."#;

/// Known integration pattern families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    #[serde(rename = "enterprise_service_bus")]
    Esb,
    PointToPoint,
    BatchTransfer,
    ApiGateway,
    EventStreaming,
    ServiceMesh,
    #[serde(other)]
    Unknown,
}

impl PatternType {
    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            PatternType::Esb => "Enterprise Service Bus",
            PatternType::PointToPoint => "Point-to-Point",
            PatternType::BatchTransfer => "Batch File Transfer",
            PatternType::ApiGateway => "API Gateway",
            PatternType::EventStreaming => "Event Streaming",
            PatternType::ServiceMesh => "Service Mesh",
            PatternType::Unknown => "Unknown",
        }
    }

    /// Whether this pattern marks a legacy landscape.
    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            PatternType::Esb | PatternType::PointToPoint | PatternType::BatchTransfer
        )
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected or recommended integration pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationPattern {
    pub pattern_type: PatternType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub systems_involved: Vec<String>,
}

/// Analysis of how the components connect today and could connect tomorrow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationAnalysis {
    #[serde(default)]
    pub current_patterns: Vec<IntegrationPattern>,
    #[serde(default)]
    pub recommended_patterns: Vec<IntegrationPattern>,
    #[serde(default)]
    pub summary: String,
}

/// Ask the model to analyze the integration landscape of the components.
pub fn analyze_components(
    client: &ClaudeClient,
    components: &[SystemComponent],
) -> Result<IntegrationAnalysis> {
    let components_info = components
        .iter()
        .map(|c| format!("- {} ({}): {}", c.name, c.category, c.description))
        .collect::<Vec<_>>()
        .join("\n");

    let raw = client.complete_text(&PATTERNS_PROMPT.replace("{components_info}", &components_info))?;
    parse_patterns(&raw)
}

fn parse_patterns(raw: &str) -> Result<IntegrationAnalysis> {
    let json_text = extract_json_block(raw);

    match serde_json::from_str(json_text) {
        Ok(parsed) => Ok(parsed),
        Err(_) => JSON_OBJECT_REGEX
            .find(json_text)
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
            .ok_or_else(|| Error::MalformedResponse {
                reason: "expected a JSON object with pattern lists".to_string(),
                raw: raw.to_string(),
            }),
    }
}

/// Detect legacy integration patterns from component names and categories.
pub fn detect_legacy_patterns(components: &[SystemComponent]) -> Vec<IntegrationPattern> {
    let mut patterns = Vec::new();

    let matching = |needles: &[&str]| -> Vec<String> {
        components
            .iter()
            .filter(|c| {
                let haystack = format!("{} {}", c.name, c.category).to_lowercase();
                needles.iter().any(|n| haystack.contains(n))
            })
            .map(|c| c.name.clone())
            .collect()
    };

    let esb = matching(&["esb", "service bus", "bus"]);
    if !esb.is_empty() {
        patterns.push(IntegrationPattern {
            pattern_type: PatternType::Esb,
            description: "Central bus mediating system-to-system traffic".to_string(),
            systems_involved: esb,
        });
    }

    let p2p = matching(&["direct", "connector", "point-to-point"]);
    if !p2p.is_empty() {
        patterns.push(IntegrationPattern {
            pattern_type: PatternType::PointToPoint,
            description: "Direct connections between individual systems".to_string(),
            systems_involved: p2p,
        });
    }

    let batch = matching(&["batch", "etl", "scheduler", "file transfer"]);
    if !batch.is_empty() {
        patterns.push(IntegrationPattern {
            pattern_type: PatternType::BatchTransfer,
            description: "Scheduled batch jobs moving data between systems".to_string(),
            systems_involved: batch,
        });
    }

    patterns
}

/// Suggest modern integration patterns for the target landscape.
pub fn suggest_modern_patterns(components: &[SystemComponent]) -> Vec<IntegrationPattern> {
    let mut patterns = Vec::new();

    let matching = |needles: &[&str]| -> Vec<String> {
        components
            .iter()
            .filter(|c| {
                let haystack = format!("{} {}", c.name, c.category).to_lowercase();
                needles.iter().any(|n| haystack.contains(n))
            })
            .map(|c| c.name.clone())
            .collect()
    };

    let gateway = matching(&["api", "gateway"]);
    if !gateway.is_empty() {
        patterns.push(IntegrationPattern {
            pattern_type: PatternType::ApiGateway,
            description: "Single managed entry point for API traffic".to_string(),
            systems_involved: gateway,
        });
    }

    let events = matching(&["event", "kafka", "queue", "message", "stream"]);
    if !events.is_empty() {
        patterns.push(IntegrationPattern {
            pattern_type: PatternType::EventStreaming,
            description: "Asynchronous events decoupling producers from consumers".to_string(),
            systems_involved: events,
        });
    }

    if components.len() > 10 {
        patterns.push(IntegrationPattern {
            pattern_type: PatternType::ServiceMesh,
            description: "Mesh handling service discovery and traffic policy at this scale"
                .to_string(),
            systems_involved: Vec::new(),
        });
    }

    patterns
}

/// Render an analysis as a short human-readable report.
pub fn format_pattern_summary(analysis: &IntegrationAnalysis) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();

    if !analysis.current_patterns.is_empty() {
        let _ = writeln!(out, "Current integration patterns:");
        for p in &analysis.current_patterns {
            let _ = writeln!(out, "  [{}] {}", p.pattern_type, p.description);
            if !p.systems_involved.is_empty() {
                let _ = writeln!(out, "    systems: {}", p.systems_involved.join(", "));
            }
        }
    }

    if !analysis.recommended_patterns.is_empty() {
        let _ = writeln!(out, "Recommended patterns:");
        for p in &analysis.recommended_patterns {
            let _ = writeln!(out, "  [{}] {}", p.pattern_type, p.description);
        }
    }

    if !analysis.summary.is_empty() {
        let _ = writeln!(out, "{}", analysis.summary);
    }

    out
}

/// Build a prompt context block describing detected patterns, for the
/// mapping call.
pub fn pattern_context(analysis: &IntegrationAnalysis) -> Option<String> {
    if analysis.current_patterns.is_empty() && analysis.recommended_patterns.is_empty() {
        return None;
    }

    let mut out = String::from("\n\nINTEGRATION PATTERNS DETECTED:\n");
    for p in &analysis.current_patterns {
        out.push_str(&format!("  current: {} - {}\n", p.pattern_type, p.description));
    }
    for p in &analysis.recommended_patterns {
        out.push_str(&format!("  recommended: {} - {}\n", p.pattern_type, p.description));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(name: &str, category: &str) -> SystemComponent {
        SystemComponent::new(name, category)
    }

    #[test]
    fn test_detect_esb_and_batch() {
        let components = vec![
            comp("Enterprise Service Bus", "middleware"),
            comp("Nightly ETL Job", "data"),
            comp("CRM", "core_banking"),
        ];

        let patterns = detect_legacy_patterns(&components);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].pattern_type, PatternType::Esb);
        assert_eq!(patterns[0].systems_involved, vec!["Enterprise Service Bus"]);
        assert_eq!(patterns[1].pattern_type, PatternType::BatchTransfer);
    }

    #[test]
    fn test_detect_nothing_in_clean_landscape() {
        let components = vec![comp("CRM", "core_banking"), comp("Portal", "channel")];
        assert!(detect_legacy_patterns(&components).is_empty());
    }

    #[test]
    fn test_suggest_gateway_and_events() {
        let components = vec![
            comp("API Gateway", "integration"),
            comp("Kafka Cluster", "middleware"),
        ];

        let patterns = suggest_modern_patterns(&components);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].pattern_type, PatternType::ApiGateway);
        assert_eq!(patterns[1].pattern_type, PatternType::EventStreaming);
    }

    #[test]
    fn test_suggest_mesh_for_large_landscape() {
        let components: Vec<_> = (0..11).map(|i| comp(&format!("Svc {i}"), "core")).collect();
        let patterns = suggest_modern_patterns(&components);
        assert!(patterns
            .iter()
            .any(|p| p.pattern_type == PatternType::ServiceMesh));
    }

    #[test]
    fn test_parse_patterns_with_unknown_type() {
        let raw = r#"{
            "current_patterns": [
                {"pattern_type": "enterprise_service_bus", "description": "bus", "systems_involved": ["ESB"]},
                {"pattern_type": "something_new", "description": "?"}
            ],
            "summary": "mixed"
        }"#;

        let analysis = parse_patterns(raw).unwrap();
        assert_eq!(analysis.current_patterns.len(), 2);
        assert_eq!(analysis.current_patterns[0].pattern_type, PatternType::Esb);
        assert_eq!(
            analysis.current_patterns[1].pattern_type,
            PatternType::Unknown
        );
        assert_eq!(analysis.summary, "mixed");
        assert!(analysis.recommended_patterns.is_empty());
    }

    #[test]
    fn test_format_and_context() {
        let analysis = IntegrationAnalysis {
            current_patterns: vec![IntegrationPattern {
                pattern_type: PatternType::PointToPoint,
                description: "direct links".to_string(),
                systems_involved: vec!["A".to_string(), "B".to_string()],
            }],
            recommended_patterns: vec![IntegrationPattern {
                pattern_type: PatternType::ApiGateway,
                description: "front door".to_string(),
                systems_involved: Vec::new(),
            }],
            summary: String::new(),
        };

        let report = format_pattern_summary(&analysis);
        assert!(report.contains("[Point-to-Point] direct links"));
        assert!(report.contains("systems: A, B"));
        assert!(report.contains("[API Gateway] front door"));

        let context = pattern_context(&analysis).unwrap();
        assert!(context.contains("INTEGRATION PATTERNS DETECTED"));
        assert!(context.contains("current: Point-to-Point"));

        assert!(pattern_context(&IntegrationAnalysis::default()).is_none());
    }
}
