// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groq-backed implementations of the address and content generators.
//!
//! Address generation is strict: an API failure is surfaced to the caller,
//! because candidates cannot be invented locally with any confidence.
//! Content generation degrades instead: any failure or unparsable
//! completion falls back to a deterministic template, so a dead LLM never
//! blocks a dispatch that already has recipients.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use mailforge_config::model::GroqConfig;
use mailforge_core::traits::{AddressGenerator, ContentGenerator, ContentParams};
use mailforge_core::types::MailBody;
use mailforge_core::MailforgeError;

use crate::client::GroqClient;

static SUBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SUBJECT:[ \t]*(.+)").unwrap());
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)BODY:[ \t]*(.+)").unwrap());
static LINE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());

fn build_client(config: &GroqConfig) -> Result<Option<GroqClient>, MailforgeError> {
    match &config.api_key {
        Some(key) => Ok(Some(GroqClient::new(
            key,
            config.model.clone(),
            config.max_tokens,
        )?)),
        None => Ok(None),
    }
}

/// Candidate recipient addresses via the Groq API.
pub struct GroqAddressGenerator {
    client: Option<GroqClient>,
}

impl GroqAddressGenerator {
    pub fn new(config: &GroqConfig) -> Result<Self, MailforgeError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl AddressGenerator for GroqAddressGenerator {
    async fn generate_addresses(
        &self,
        first_name: &str,
        last_name: &str,
        domain: &str,
    ) -> Result<Vec<String>, MailforgeError> {
        let client = self.client.as_ref().ok_or_else(|| {
            MailforgeError::Config("groq.api_key is not configured".to_string())
        })?;

        let prompt = address_prompt(first_name, last_name, domain);
        let completion = client
            .complete("You are an email generator AI.", &prompt, None)
            .await?;

        let addresses = parse_address_lines(&completion);
        if addresses.is_empty() {
            return Err(MailforgeError::Generation {
                message: "completion contained no email suggestions".into(),
                source: None,
            });
        }
        debug!(count = addresses.len(), domain, "generated address candidates");
        Ok(addresses)
    }
}

/// Email copy via the Groq API, with a deterministic template fallback.
pub struct GroqContentGenerator {
    client: Option<GroqClient>,
}

impl GroqContentGenerator {
    pub fn new(config: &GroqConfig) -> Result<Self, MailforgeError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl ContentGenerator for GroqContentGenerator {
    async fn generate_content(&self, params: &ContentParams) -> Result<MailBody, MailforgeError> {
        let Some(client) = self.client.as_ref() else {
            debug!("no Groq API key configured, using fallback template");
            return Ok(fallback_content(params));
        };

        let prompt = content_prompt(params);
        match client
            .complete(
                "You are an expert email marketing copywriter. Generate professional, \
                 personalized email content that converts.",
                &prompt,
                Some(0.7),
            )
            .await
        {
            Ok(completion) => Ok(parse_generated_content(&completion, params)),
            Err(e) => {
                warn!(error = %e, "content generation failed, using fallback template");
                Ok(fallback_content(params))
            }
        }
    }
}

/// Prompt requesting exactly ten candidate addresses, one per numbered line.
fn address_prompt(first_name: &str, last_name: &str, domain: &str) -> String {
    format!(
        "Generate exactly 10 unique professional email address suggestions for:\n\
         - First Name: {first_name}\n\
         - Last Name: {last_name}\n\
         - Domain: {domain}\n\n\
         Use only these patterns: first@domain, first.last@domain, first_last@domain, \
         first.l@domain, first_l@domain, last@domain, last.first@domain, \
         firstlast@domain, lastfirst@domain, and a truncated firstlas@domain.\n\n\
         Rules:\n\
         - All suggestions must be unique, no duplicates.\n\
         - No nicknames, personal identifiers, or combinations outside the patterns.\n\
         - Output exactly 10 numbered lines, one address per line.\n\
         - No explanations or any other text."
    )
}

/// Extract addresses from numbered completion lines.
fn parse_address_lines(completion: &str) -> Vec<String> {
    completion
        .lines()
        .map(|line| LINE_NUMBER_RE.replace(line.trim(), "").trim().to_string())
        .filter(|line| line.contains('@'))
        .collect()
}

/// Derive a display name from a target domain ("acme-corp.com" -> "Acme Corp").
fn company_name_from_domain(domain: &str) -> String {
    let stem = domain.split('.').next().unwrap_or(domain);
    stem.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn content_prompt(params: &ContentParams) -> String {
    let company = params
        .target_domain
        .as_deref()
        .map(company_name_from_domain)
        .unwrap_or_else(|| "the company".to_string());
    let tone = params.tone.as_deref().unwrap_or("professional");
    let sender = params.sender_name.as_deref().unwrap_or("Professional");
    let call_to_action = params
        .call_to_action
        .as_deref()
        .unwrap_or("I would appreciate the opportunity to discuss this further");

    let mut prompt = format!(
        "Generate a personalized professional email with the following context:\n\n\
         TARGET COMPANY: {company}\n\
         PURPOSE: {purpose}\n\
         RECIPIENT: {recipient} at {company}\n\
         EMAIL TONE: {tone}\n\n\
         SENDER: {sender}\n",
        purpose = params.purpose,
        recipient = params.recipient_type,
    );
    if let Some(industry) = &params.industry {
        prompt.push_str(&format!("INDUSTRY FOCUS: {industry}\n"));
    }
    if !params.key_points.is_empty() {
        prompt.push_str(&format!("KEY POINTS: {}\n", params.key_points.join(", ")));
    }
    prompt.push_str(&format!(
        "\nCALL TO ACTION: {call_to_action}\n\n\
         INSTRUCTIONS:\n\
         1. Reference {company} naturally.\n\
         2. Show genuine interest and demonstrate the value the sender brings.\n\
         3. Use a {tone} tone throughout.\n\
         4. Keep the email concise, 2-3 paragraphs at most.\n\
         5. Avoid generic templates.\n\n\
         FORMAT:\n\
         SUBJECT: [compelling subject line mentioning {company}, max 60 chars]\n\
         BODY: [personalized email body]"
    ));
    prompt
}

/// Parse a `SUBJECT:`/`BODY:` completion, filling any missing piece from the
/// deterministic template.
fn parse_generated_content(completion: &str, params: &ContentParams) -> MailBody {
    let fallback = fallback_content(params);

    // A marker followed by only whitespace is as unusable as no marker.
    let subject = SUBJECT_RE
        .captures(completion)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback.subject);
    let description = BODY_RE
        .captures(completion)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback.description);
    let html_body = Some(description.replace('\n', "<br>"));

    MailBody {
        subject,
        description,
        html_body,
    }
}

/// Deterministic template used when the API is unavailable or unparsable.
fn fallback_content(params: &ContentParams) -> MailBody {
    let truncated: String = params.purpose.chars().take(40).collect();
    let subject = if params.purpose.chars().count() > 40 {
        format!("Regarding: {}...", truncated.trim_end())
    } else {
        format!("Regarding: {truncated}")
    };

    let call_to_action = params.call_to_action.as_deref().unwrap_or(
        "I would appreciate the opportunity to connect and explore how we can work together.",
    );
    let sender = params.sender_name.as_deref().unwrap_or("Your Name");
    let description = format!(
        "Dear {recipient},\n\n\
         I hope this email finds you well. {purpose}\n\n\
         I believe this could be a great opportunity for mutual benefit, and I would \
         love to discuss this further with you.\n\n\
         {call_to_action}\n\n\
         Looking forward to your response.\n\n\
         Best regards,\n\
         {sender}",
        recipient = params.recipient_type,
        purpose = params.purpose,
    );
    let html_body = Some(description.replace('\n', "<br>"));

    MailBody {
        subject,
        description,
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ContentParams {
        ContentParams {
            purpose: "exploring a backend engineering role on your platform team".into(),
            recipient_type: "Hiring Manager".into(),
            sender_name: Some("Ada Lovelace".into()),
            target_domain: Some("acme-corp.com".into()),
            ..ContentParams::default()
        }
    }

    #[test]
    fn parses_numbered_address_lines() {
        let completion = "1. ada@acme.com\n2. ada.lovelace@acme.com\n\n3. lovelace@acme.com\nDone!";
        let addresses = parse_address_lines(completion);
        assert_eq!(
            addresses,
            vec!["ada@acme.com", "ada.lovelace@acme.com", "lovelace@acme.com"]
        );
    }

    #[test]
    fn company_name_strips_tld_and_separators() {
        assert_eq!(company_name_from_domain("acme-corp.com"), "Acme Corp");
        assert_eq!(company_name_from_domain("google.co.uk"), "Google");
        assert_eq!(company_name_from_domain("big_data.io"), "Big Data");
    }

    #[test]
    fn parses_subject_and_body_markers() {
        let completion =
            "SUBJECT: Backend engineering at Acme Corp\nBODY: Dear Hiring Manager,\n\nFirst.\n\nSecond.";
        let body = parse_generated_content(completion, &params());
        assert_eq!(body.subject, "Backend engineering at Acme Corp");
        assert!(body.description.starts_with("Dear Hiring Manager,"));
        assert!(body.description.ends_with("Second."));
        assert_eq!(
            body.html_body.as_deref(),
            Some(body.description.replace('\n', "<br>").as_str())
        );
    }

    #[test]
    fn whitespace_only_marker_falls_back_per_piece() {
        // A CRLF right after the marker leaves a "\r" capture that trims to
        // nothing; the subject must come from the template instead.
        let body = parse_generated_content("SUBJECT: \r\nBODY: hi", &params());
        assert!(body.subject.starts_with("Regarding: exploring a backend"));
        assert_eq!(body.description, "hi");

        let body = parse_generated_content("SUBJECT: Hello\nBODY:   ", &params());
        assert_eq!(body.subject, "Hello");
        assert!(body.description.contains("Dear Hiring Manager,"));
    }

    #[test]
    fn unparsable_completion_falls_back_per_piece() {
        let body = parse_generated_content("just some rambling text", &params());
        assert!(body.subject.starts_with("Regarding: exploring a backend"));
        assert!(body.description.contains("Dear Hiring Manager,"));
        assert!(body.description.contains("Best regards,\nAda Lovelace"));
    }

    #[test]
    fn fallback_subject_truncates_long_purpose() {
        // 40 chars of this purpose end on a word boundary; no dangling space
        // before the ellipsis.
        let body = fallback_content(&params());
        assert_eq!(
            body.subject,
            "Regarding: exploring a backend engineering role on..."
        );

        let short = ContentParams {
            purpose: "a quick hello".into(),
            ..params()
        };
        assert_eq!(fallback_content(&short).subject, "Regarding: a quick hello");
    }

    #[tokio::test]
    async fn content_generator_without_key_uses_fallback() {
        let generator = GroqContentGenerator::new(&GroqConfig::default()).unwrap();
        let body = generator.generate_content(&params()).await.unwrap();
        assert!(body.subject.starts_with("Regarding:"));
    }

    #[tokio::test]
    async fn address_generator_without_key_is_an_error() {
        let generator = GroqAddressGenerator::new(&GroqConfig::default()).unwrap();
        let err = generator
            .generate_addresses("Ada", "Lovelace", "acme.com")
            .await
            .unwrap_err();
        assert!(matches!(err, MailforgeError::Config(_)));
    }
}
