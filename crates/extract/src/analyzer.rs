//! Architecture source analysis.
//!
//! Sends a whiteboard photo, free-text notes, or Mermaid diagram source to
//! the model and parses the response into extracted system components. The
//! response is untrusted input: missing fields default, and a response that
//! cannot be parsed at all surfaces the original text.

use std::path::Path;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use dsd_core::{extract_json_block, Error, Result, SystemComponent};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::client::ClaudeClient;

/// Maximum accepted image payload (the API limit).
const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

static JSON_OBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

const IMAGE_PROMPT: &str = r#"Analyze this architecture diagram/whiteboard image and extract all system components.

For each component you identify, provide:
1. The exact name/label visible in the image
2. Its category (one of: channel, integration, middleware, core_banking, data, external, infrastructure, security, monitoring)
3. A brief description of what it likely does
4. Its architectural layer if discernible (presentation, application, integration, data, infrastructure)

IMPORTANT:
- Extract the EXACT text/names visible in the image
- If text is hard to read, make your best interpretation
- Include ALL boxes, systems, and labeled components
- Preserve the original naming (don't normalize or standardize names)

Return your analysis as JSON with this structure:
{
    "source_type": "whiteboard|diagram|mermaid|notes",
    "layers_identified": ["list", "of", "layers"],
    "components": [
        {
            "name": "Exact System Name",
            "category": "category",
            "description": "Brief description",
            "layer": "layer name"
        }
    ]
}

Return ONLY the JSON, no other text."#;

const NOTES_PROMPT: &str = r#"Analyze these architecture notes and extract all system components mentioned.

NOTES:
{notes}

For each component mentioned, provide:
1. The exact name
2. Its category (one of: channel, integration, middleware, core_banking, data, external, infrastructure, security, monitoring)
3. A brief description
4. Its architectural layer if discernible

Return your analysis as JSON with this structure:
{
    "source_type": "notes",
    "layers_identified": ["list", "of", "layers"],
    "components": [
        {
            "name": "System Name",
            "category": "category",
            "description": "Brief description",
            "layer": "layer name"
        }
    ]
}

Return ONLY the JSON, no other text."#;

const MERMAID_PROMPT: &str = r#"Analyze this Mermaid diagram code and extract all system components.

MERMAID CODE:
```mermaid
{mermaid}
```

For each component/node in the diagram, provide:
1. The exact name/label
2. Its category (one of: channel, integration, middleware, core_banking, data, external, infrastructure, security, monitoring)
3. A brief description
4. Its architectural layer if discernible from the diagram structure

Return your analysis as JSON with this structure:
{
    "source_type": "mermaid",
    "layers_identified": ["list", "of", "layers"],
    "components": [
        {
            "name": "System Name",
            "category": "category",
            "description": "Brief description",
            "layer": "layer name"
        }
    ]
}

Return ONLY the JSON, no other text."#;

/// Result of analyzing an architecture source.
#[derive(Debug, Clone)]
pub struct ArchitectureAnalysis {
    /// Extracted components, in response order.
    pub components: Vec<SystemComponent>,
    /// Architectural layers the model identified.
    pub layers: Vec<String>,
    /// What kind of source the model saw ("whiteboard", "notes", ...).
    pub source_type: String,
    /// The raw response text, kept for diagnosis.
    pub raw_analysis: String,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    source_type: Option<String>,
    #[serde(default)]
    layers_identified: Vec<String>,
    #[serde(default)]
    components: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    layer: Option<String>,
}

/// Analyzer over a Claude client.
pub struct ArchitectureAnalyzer {
    client: ClaudeClient,
}

impl ArchitectureAnalyzer {
    /// Create an analyzer over the given client.
    pub fn new(client: ClaudeClient) -> Self {
        Self { client }
    }

    /// The underlying client, for callers making their own model calls.
    pub fn client(&self) -> &ClaudeClient {
        &self.client
    }

    /// Analyze an architecture image (whiteboard photo, exported diagram).
    pub fn analyze_image(&self, image_path: impl AsRef<Path>) -> Result<ArchitectureAnalysis> {
        let path = image_path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > MAX_IMAGE_BYTES {
            return Err(Error::UnsupportedFormat(format!(
                "image {} is {} bytes, above the {} byte API limit",
                path.display(),
                size,
                MAX_IMAGE_BYTES
            )));
        }

        let media_type = media_type_for(path)?;
        let data = BASE64_STANDARD.encode(std::fs::read(path)?);

        let raw = self.client.complete(vec![
            json!({
                "type": "image",
                "source": { "type": "base64", "media_type": media_type, "data": data }
            }),
            json!({ "type": "text", "text": IMAGE_PROMPT }),
        ])?;

        parse_analysis(&raw, "diagram")
    }

    /// Analyze free-text notes describing an architecture.
    pub fn analyze_notes(&self, notes: &str) -> Result<ArchitectureAnalysis> {
        let raw = self
            .client
            .complete_text(&NOTES_PROMPT.replace("{notes}", notes))?;
        parse_analysis(&raw, "notes")
    }

    /// Analyze Mermaid diagram source.
    pub fn analyze_mermaid(&self, mermaid_code: &str) -> Result<ArchitectureAnalysis> {
        let raw = self
            .client
            .complete_text(&MERMAID_PROMPT.replace("{mermaid}", mermaid_code))?;
        parse_analysis(&raw, "mermaid")
    }
}

/// Media type for an image file, by extension.
fn media_type_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        other => Err(Error::UnsupportedFormat(format!(
            "unsupported image extension '{}'",
            other
        ))),
    }
}

/// Parse a raw analysis response into components.
pub fn parse_analysis(raw: &str, default_source_type: &str) -> Result<ArchitectureAnalysis> {
    let json_text = extract_json_block(raw);

    let parsed: RawAnalysis = match serde_json::from_str(json_text) {
        Ok(parsed) => parsed,
        Err(_) => JSON_OBJECT_REGEX
            .find(json_text)
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
            .ok_or_else(|| Error::MalformedResponse {
                reason: "expected a JSON object with a \"components\" list".to_string(),
                raw: raw.to_string(),
            })?,
    };

    let components = parsed
        .components
        .into_iter()
        .map(|c| {
            SystemComponent::new(
                c.name.unwrap_or_else(|| "Unknown".to_string()),
                c.category.unwrap_or_else(|| "unknown".to_string()),
            )
            .with_layer(c.layer.unwrap_or_default())
            .with_description(c.description.unwrap_or_default())
        })
        .collect();

    Ok(ArchitectureAnalysis {
        components,
        layers: parsed.layers_identified,
        source_type: parsed
            .source_type
            .unwrap_or_else(|| default_source_type.to_string()),
        raw_analysis: raw.to_string(),
    })
}
