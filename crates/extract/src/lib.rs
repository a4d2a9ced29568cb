//! Model-backed extraction: turn architecture sources (images, notes,
//! Mermaid) into system components and suggest placeholder mappings.

pub mod analyzer;
pub mod client;
pub mod mapping;
pub mod patterns;

pub use analyzer::{ArchitectureAnalysis, ArchitectureAnalyzer};
pub use client::{ClaudeClient, DEFAULT_MODEL};
pub use mapping::suggest_mapping;
pub use patterns::{
    analyze_components, detect_legacy_patterns, format_pattern_summary, pattern_context,
    suggest_modern_patterns, IntegrationAnalysis, IntegrationPattern, PatternType,
};
