//! Medium post to Markdown conversion.
//!
//! Medium serves a post as JSON at `/p/<id>?format=json`, behind an
//! anti-hijacking prefix. The post body is a flat list of typed paragraphs;
//! each type maps to one Markdown construct.

use std::time::Duration;

use async_trait::async_trait;
use canivete_core::contract::ConvertMediumToMdOutput;
use canivete_core::{InternetService, ServiceError, ServiceResult};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Prefix Medium puts in front of every JSON response.
pub const JSON_HIJACKING_PREFIX: &str = "])}while(1);</x>";

/// Where Medium serves images from.
pub const IMAGE_BASE_URL: &str = "https://miro.medium.com/max/1400/";

#[derive(Debug, Deserialize)]
struct MediumEnvelope {
    payload: MediumPayload,
}

#[derive(Debug, Deserialize)]
struct MediumPayload {
    value: MediumPost,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MediumPost {
    title: String,
    content: MediumContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MediumContent {
    body_model: BodyModel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BodyModel {
    paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Paragraph {
    #[serde(rename = "type")]
    kind: u32,
    text: String,
    metadata: Option<ImageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageMetadata {
    id: String,
}

/// Markdown construct for one paragraph type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Text,
    Heading,
    Subheading,
    Image,
    Quote,
    Code,
    Bullet,
    Numbered,
}

impl Block {
    fn from_kind(kind: u32) -> Option<Self> {
        match kind {
            1 => Some(Self::Text),
            3 => Some(Self::Heading),
            4 => Some(Self::Image),
            6 | 7 => Some(Self::Quote),
            8 => Some(Self::Code),
            9 => Some(Self::Bullet),
            10 => Some(Self::Numbered),
            13 => Some(Self::Subheading),
            _ => None,
        }
    }

    fn is_list(self) -> bool {
        matches!(self, Self::Bullet | Self::Numbered)
    }

    fn render(self, paragraph: &Paragraph) -> String {
        let text = paragraph.text.as_str();
        match self {
            Self::Text => text.to_string(),
            Self::Heading => format!("# {text}"),
            Self::Subheading => format!("## {text}"),
            Self::Quote => text
                .lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Code => format!("```\n{text}\n```"),
            Self::Bullet => format!("- {text}"),
            Self::Numbered => format!("1. {text}"),
            Self::Image => {
                let id = paragraph.metadata.as_ref().map_or("", |m| m.id.as_str());
                format!("![{text}]({IMAGE_BASE_URL}{id})")
            }
        }
    }
}

fn render_markdown(post: &MediumPost) -> String {
    let mut markdown = format!("# {}", post.title);
    let mut previous: Option<Block> = None;

    for (index, paragraph) in post.content.body_model.paragraphs.iter().enumerate() {
        // Medium repeats the title as the first paragraph
        if index == 0 && paragraph.text == post.title {
            continue;
        }
        let Some(block) = Block::from_kind(paragraph.kind) else {
            tracing::debug!(kind = paragraph.kind, "skipping unsupported paragraph");
            continue;
        };

        let separator = match previous {
            Some(prev) if prev == block && block.is_list() => "\n",
            _ => "\n\n",
        };
        markdown.push_str(separator);
        markdown.push_str(&block.render(paragraph));
        previous = Some(block);
    }

    markdown
}

fn parse_post(body: &str) -> ServiceResult<MediumPost> {
    let json = body.strip_prefix(JSON_HIJACKING_PREFIX).unwrap_or(body);
    serde_json::from_str::<MediumEnvelope>(json)
        .map(|envelope| envelope.payload.value)
        .map_err(|e| ServiceError::failed(format!("unexpected medium response: {e}")))
}

fn valid_post_id(post_id: &str) -> bool {
    post_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Fetches Medium posts over HTTP and renders them as Markdown.
#[derive(Debug, Clone)]
pub struct MediumService {
    client: Client,
    base_url: String,
}

impl MediumService {
    /// Creates a client for the Medium origin at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("canivete-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::service(format!("failed to create medium client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the Medium origin.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, post_id: &str) -> ServiceResult<String> {
        let url = format!("{}/p/{post_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("format", "json")])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::failed(format!("error fetching post {post_id}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::failed(format!(
                "medium answered {status} for post {post_id}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ServiceError::failed(format!("error reading post {post_id}: {e}")))
    }
}

#[async_trait]
impl InternetService for MediumService {
    async fn convert_medium_to_md(&self, post_id: &str) -> ServiceResult<ConvertMediumToMdOutput> {
        let post_id = post_id.trim();
        if post_id.is_empty() {
            return Err(ServiceError::invalid_input("post id is required"));
        }
        if !valid_post_id(post_id) {
            return Err(ServiceError::invalid_input(format!(
                "post id {post_id:?} is invalid"
            )));
        }

        let body = self.fetch(post_id).await?;
        let post = parse_post(&body)?;

        Ok(ConvertMediumToMdOutput {
            post_id: post_id.to_string(),
            markdown: render_markdown(&post),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(paragraphs: serde_json::Value) -> MediumPost {
        let body = format!(
            "{JSON_HIJACKING_PREFIX}{}",
            json!({
                "success": true,
                "payload": {"value": {
                    "title": "A pretty nice markdown",
                    "content": {"bodyModel": {"paragraphs": paragraphs}}
                }}
            })
        );
        parse_post(&body).unwrap()
    }

    #[test]
    fn test_renders_every_block() {
        let post = post(json!([
            {"type": 3, "text": "A pretty nice markdown"},
            {"type": 1, "text": "Intro."},
            {"type": 13, "text": "Details"},
            {"type": 9, "text": "one"},
            {"type": 9, "text": "two"},
            {"type": 10, "text": "first"},
            {"type": 6, "text": "quoted"},
            {"type": 8, "text": "let x = 1;"},
            {"type": 4, "text": "a cat", "metadata": {"id": "1*cat.png"}},
            {"type": 3, "text": "The end"},
        ]));

        let expected = "# A pretty nice markdown\n\n\
            Intro.\n\n\
            ## Details\n\n\
            - one\n\
            - two\n\n\
            1. first\n\n\
            > quoted\n\n\
            ```\nlet x = 1;\n```\n\n\
            ![a cat](https://miro.medium.com/max/1400/1*cat.png)\n\n\
            # The end";
        assert_eq!(render_markdown(&post), expected);
    }

    #[test]
    fn test_unknown_paragraphs_are_skipped() {
        let post = post(json!([
            {"type": 1, "text": "kept"},
            {"type": 11, "text": "embedded iframe"},
        ]));
        assert_eq!(render_markdown(&post), "# A pretty nice markdown\n\nkept");
    }

    #[test]
    fn test_parse_without_prefix() {
        let body = r#"{"payload": {"value": {"title": "T"}}}"#;
        let post = parse_post(body).unwrap();
        assert_eq!(render_markdown(&post), "# T");
    }

    #[test]
    fn test_parse_garbage_fails() {
        let err = parse_post("<html>").unwrap_err();
        assert!(matches!(err, ServiceError::Failed(_)));
    }

    #[test]
    fn test_post_id_charset() {
        assert!(valid_post_id("b5f7e5a7f1c2"));
        assert!(valid_post_id("my-post_1"));
        assert!(!valid_post_id("../admin"));
        assert!(!valid_post_id("a b"));
    }

    #[tokio::test]
    async fn test_empty_post_id_is_invalid_input() {
        let service = MediumService::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();

        let err = service.convert_medium_to_md("  ").await.unwrap_err();
        assert_eq!(err, ServiceError::invalid_input("post id is required"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let service = MediumService::new("https://medium.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(service.base_url(), "https://medium.com");
    }
}
