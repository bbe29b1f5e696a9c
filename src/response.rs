use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use url::Url;

pub const DEFAULT_DISCLAIMER: &str = "Remember: DermAI Coach is a support tool, not a doctor. Please consult a dermatologist for any medical concerns.";

/// Structured result of one skin check-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WellnessResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub visual_interpretation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub symptom_summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub wellness_suggestions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub trackable_summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub disclaimer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted_resources: Option<Vec<Resource>>,
}

/// Models sometimes send `null` for a field they have nothing to say about.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl WellnessResponse {
    /// Payload shown when the model reply cannot be read as analysis JSON.
    pub fn fallback() -> Self {
        Self {
            visual_interpretation:
                "We encountered an error processing the results. Please try again.".to_string(),
            symptom_summary: "Analysis unavailable.".to_string(),
            wellness_suggestions: vec![
                "Please ensure your image is clear.".to_string(),
                "Try describing your symptoms again.".to_string(),
            ],
            trackable_summary: "Error in analysis.".to_string(),
            disclaimer: "System error occurred.".to_string(),
            trusted_resources: Some(Vec::new()),
        }
    }

    pub fn disclaimer_or_default(&self) -> &str {
        if self.disclaimer.trim().is_empty() {
            DEFAULT_DISCLAIMER
        } else {
            &self.disclaimer
        }
    }

    pub fn resources(&self) -> &[Resource] {
        self.trusted_resources.as_deref().unwrap_or_default()
    }
}

/// A web page cited by the model's search grounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

impl Resource {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Host name for display, or the raw URL when it does not parse.
    pub fn host(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.clone())
    }

    /// Only http(s) citations are rendered as clickable links.
    pub fn is_linkable(&self) -> bool {
        Url::parse(&self.url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

/// Collapses resources sharing a URL. Order follows first appearance; the last title wins.
pub fn dedupe_resources(resources: impl IntoIterator<Item = Resource>) -> Vec<Resource> {
    let mut unique: Vec<Resource> = Vec::new();
    for resource in resources {
        match unique.iter_mut().find(|seen| seen.url == resource.url) {
            Some(seen) => seen.title = resource.title,
            None => unique.push(resource),
        }
    }
    unique
}

/// Isolates the JSON object inside a raw model reply.
///
/// Trims, drops a leading "```json" fence and a trailing "```", then keeps the span from the
/// first `{` to the last `}` so prose around the object is discarded.
pub fn extract_json(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

/// Turns a model reply plus its grounding citations into a [`WellnessResponse`].
///
/// Never fails: an unreadable reply yields [`WellnessResponse::fallback`].
pub fn parse_reply(text: &str, citations: Vec<Resource>) -> WellnessResponse {
    let json = extract_json(text);
    match serde_json::from_str::<WellnessResponse>(json) {
        Ok(mut parsed) => {
            parsed.trusted_resources = Some(dedupe_resources(citations));
            parsed
        }
        Err(err) => {
            warn!(error = %err, reply_len = text.len(), "model reply is not analysis JSON");
            WellnessResponse::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
  "visualInterpretation": "Mild redness with some dry patches.",
  "symptomSummary": "Itching after swimming.",
  "wellnessSuggestions": ["Rinse after swimming", "Use a fragrance-free moisturizer"],
  "trackableSummary": "Day 3: itch 4/10, redness fading.",
  "disclaimer": "Not medical advice."
}"#;

    #[test]
    fn fenced_reply_matches_bare_object() {
        let fenced = format!("```json\n{BODY}\n```");
        assert_eq!(parse_reply(&fenced, Vec::new()), parse_reply(BODY, Vec::new()));
        assert_eq!(
            parse_reply(&fenced, Vec::new()).symptom_summary,
            "Itching after swimming."
        );
    }

    #[test]
    fn prose_around_object_is_dropped() {
        let wrapped = format!("Here is your analysis:\n{BODY}\nStay well!");
        assert_eq!(extract_json(&wrapped), BODY);
        let parsed = parse_reply(&wrapped, Vec::new());
        assert_eq!(parsed.wellness_suggestions.len(), 2);
        assert_eq!(parsed.disclaimer, "Not medical advice.");
    }

    #[test]
    fn unparseable_reply_falls_back() {
        for reply in ["I cannot help with that.", "{not json}", "} backwards {", "[1, 2]"] {
            let parsed = parse_reply(reply, vec![Resource::new("X", "https://a.example")]);
            assert_eq!(parsed, WellnessResponse::fallback(), "{reply}");
            assert!(parsed.resources().is_empty());
        }
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let parsed = parse_reply(r#"{"visualInterpretation": "I cannot process this request due to safety guidelines."}"#, Vec::new());
        assert_eq!(
            parsed.visual_interpretation,
            "I cannot process this request due to safety guidelines."
        );
        assert!(parsed.wellness_suggestions.is_empty());
        assert_eq!(parsed.disclaimer_or_default(), DEFAULT_DISCLAIMER);
        assert_eq!(parsed.trusted_resources, Some(Vec::new()));
    }

    #[test]
    fn null_fields_read_as_empty() {
        let reply = r#"{"visualInterpretation": "Mild dryness.", "symptomSummary": null, "wellnessSuggestions": null, "trackableSummary": "Itch 2/10.", "disclaimer": null}"#;
        let parsed = parse_reply(reply, vec![Resource::new("AAD", "https://www.aad.org/")]);
        assert_ne!(parsed, WellnessResponse::fallback());
        assert_eq!(parsed.visual_interpretation, "Mild dryness.");
        assert_eq!(parsed.symptom_summary, "");
        assert!(parsed.wellness_suggestions.is_empty());
        assert_eq!(parsed.disclaimer_or_default(), DEFAULT_DISCLAIMER);
        assert_eq!(parsed.resources().len(), 1);
    }

    #[test]
    fn citations_dedupe_by_url_keeping_last_title() {
        let citations = vec![
            Resource::new("X", "a"),
            Resource::new("Y", "a"),
            Resource::new("Z", "b"),
        ];
        assert_eq!(
            dedupe_resources(citations.clone()),
            vec![Resource::new("Y", "a"), Resource::new("Z", "b")]
        );
        let parsed = parse_reply(BODY, citations);
        assert_eq!(parsed.resources().len(), 2);
    }

    #[test]
    fn resource_host_and_linkability() {
        let aad = Resource::new("AAD", "https://www.aad.org/public/everyday-care");
        assert_eq!(aad.host(), "www.aad.org");
        assert!(aad.is_linkable());

        let odd = Resource::new("Odd", "javascript:alert(1)");
        assert!(!odd.is_linkable());

        let raw = Resource::new("Raw", "not a url");
        assert_eq!(raw.host(), "not a url");
        assert!(!raw.is_linkable());
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(WellnessResponse::fallback()).unwrap();
        assert!(value.get("visualInterpretation").is_some());
        assert!(value.get("wellnessSuggestions").is_some());
        assert_eq!(value["trustedResources"], serde_json::json!([]));
    }
}
