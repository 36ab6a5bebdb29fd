//! # Lesson Schema
//!
//! Document model for generated lessons: bundles, lesson plans, sections,
//! content blocks and citations.
//!
//! `ContentBlock` enforces its per-variant invariants at construction and on
//! deserialization. The collection invariants (non-empty key points, sections,
//! objectives, lessons) are checked by the `validate` methods, which the
//! synthesis skill runs on every generated bundle.

use crate::error::ValidationError;
use radkit::macros::LLMOutput;
use radkit::tryparse::deserializer::{CoercionContext, LlmDeserialize};
use radkit::tryparse::error::{DeserializeError, ParseError};
use radkit::tryparse::value::FlexValue;
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Learner level targeted by a lesson
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, LLMOutput, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
pub enum LearnerLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl LearnerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearnerLevel::Beginner => "beginner",
            LearnerLevel::Intermediate => "intermediate",
            LearnerLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for LearnerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearnerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(LearnerLevel::Beginner),
            "intermediate" => Ok(LearnerLevel::Intermediate),
            "advanced" => Ok(LearnerLevel::Advanced),
            other => Err(format!(
                "unknown learner level '{}' (expected beginner, intermediate or advanced)",
                other
            )),
        }
    }
}

/// Format/category of a recommended resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, LLMOutput, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Article,
    Video,
    Paper,
    Book,
    Documentation,
    Other,
}

/// Text block: explanations, examples or facilitator notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    text: String,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, rejecting blank values.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), ValidationError> {
        *self = Self::new(text)?;
        Ok(())
    }
}

/// Image block: a prompt describing the visual plus optional caption and asset URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    prompt: String,
    caption: Option<String>,
    url: Option<Url>,
}

impl ImageBlock {
    pub fn new(prompt: impl Into<String>) -> Result<Self, ValidationError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ValidationError::EmptyImagePrompt);
        }
        Ok(Self {
            prompt,
            caption: None,
            url: None,
        })
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Parse and attach an absolute URL.
    pub fn with_url_str(self, url: &str) -> Result<Self, ValidationError> {
        Ok(self.with_url(parse_absolute_url(url)?))
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<(), ValidationError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ValidationError::EmptyImagePrompt);
        }
        self.prompt = prompt;
        Ok(())
    }

    pub fn set_caption(&mut self, caption: Option<String>) {
        self.caption = caption;
    }
}

/// A content block inside a lesson section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContentBlockWire", into = "ContentBlockWire")]
pub enum ContentBlock {
    Text(TextBlock),
    Image(ImageBlock),
}

impl ContentBlock {
    /// Build a text block, rejecting blank text.
    pub fn text(text: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(ContentBlock::Text(TextBlock::new(text)?))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(block) => Some(block.text()),
            ContentBlock::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            ContentBlock::Image(block) => Some(block),
            ContentBlock::Text(_) => None,
        }
    }
}

impl From<ImageBlock> for ContentBlock {
    fn from(block: ImageBlock) -> Self {
        ContentBlock::Image(block)
    }
}

impl From<TextBlock> for ContentBlock {
    fn from(block: TextBlock) -> Self {
        ContentBlock::Text(block)
    }
}

/// Discriminator of a content block on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ContentBlockType {
    Text,
    Image,
}

/// Flat wire shape of a content block, as produced by the generator
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct ContentBlockWire {
    /// Either "text" or "image"
    #[serde(rename = "type")]
    kind: ContentBlockType,
    /// Textual content for the block when type is 'text'
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Prompt describing an image to generate or retrieve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_prompt: Option<String>,
    /// Suggested caption for the image block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_caption: Option<String>,
    /// Optional remote asset URL for the generated or fetched image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl TryFrom<ContentBlockWire> for ContentBlock {
    type Error = ValidationError;

    fn try_from(wire: ContentBlockWire) -> Result<Self, Self::Error> {
        match wire.kind {
            ContentBlockType::Text => ContentBlock::text(wire.text.unwrap_or_default()),
            ContentBlockType::Image => {
                let mut block = ImageBlock::new(wire.image_prompt.unwrap_or_default())?;
                block.caption = wire.image_caption;
                if let Some(url) = wire.image_url.as_deref() {
                    block = block.with_url_str(url)?;
                }
                Ok(ContentBlock::Image(block))
            }
        }
    }
}

impl From<ContentBlock> for ContentBlockWire {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Text(text) => ContentBlockWire {
                kind: ContentBlockType::Text,
                text: Some(text.text),
                image_prompt: None,
                image_caption: None,
                image_url: None,
            },
            ContentBlock::Image(image) => ContentBlockWire {
                kind: ContentBlockType::Image,
                text: None,
                image_prompt: Some(image.prompt),
                image_caption: image.caption,
                image_url: image.url.map(String::from),
            },
        }
    }
}

impl JsonSchema for ContentBlock {
    fn schema_name() -> Cow<'static, str> {
        "ContentBlock".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        ContentBlockWire::json_schema(generator)
    }
}

/// Decode generator output with the type's serde impl, so wire renames and
/// construction checks apply to structured output too.
fn from_llm_value<T: DeserializeOwned>(value: &FlexValue) -> radkit::tryparse::error::Result<T> {
    serde_json::from_value(value.value.clone())
        .map_err(|e| ParseError::DeserializeFailed(DeserializeError::Custom(e.to_string())))
}

impl LlmDeserialize for ContentBlock {
    fn try_deserialize(value: &FlexValue, _ctx: &mut CoercionContext) -> Option<Self> {
        from_llm_value(value).ok()
    }

    fn deserialize(
        value: &FlexValue,
        _ctx: &mut CoercionContext,
    ) -> radkit::tryparse::error::Result<Self> {
        from_llm_value(value)
    }
}

/// External resource recommended for learners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceResource {
    /// Resource title
    pub title: String,
    /// Resource format/category
    #[serde(rename = "type")]
    pub kind: ResourceType,
    /// Optional URL pointing to the resource
    #[serde(default)]
    pub url: Option<Url>,
    /// Context on when/how to use the resource
    #[serde(default)]
    pub notes: Option<String>,
}

impl LlmDeserialize for ReferenceResource {
    fn try_deserialize(value: &FlexValue, _ctx: &mut CoercionContext) -> Option<Self> {
        from_llm_value(value).ok()
    }

    fn deserialize(
        value: &FlexValue,
        _ctx: &mut CoercionContext,
    ) -> radkit::tryparse::error::Result<Self> {
        from_llm_value(value)
    }
}

/// Metadata about a source consulted during research
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct SourceCitation {
    /// Stable identifier (URL or doc path)
    pub source_id: String,
    /// Summary of what this source covers
    pub description: String,
}

impl SourceCitation {
    pub fn new(source_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            description: description.into(),
        }
    }
}

/// A single major section inside a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct LessonSection {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
}

impl LessonSection {
    pub fn has_image(&self) -> bool {
        self.content_blocks.iter().any(ContentBlock::is_image)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_points.is_empty() {
            return Err(ValidationError::EmptyKeyPoints {
                section: self.title.clone(),
            });
        }
        if self.content_blocks.is_empty() {
            return Err(ValidationError::EmptyContentBlocks {
                section: self.title.clone(),
            });
        }
        Ok(())
    }
}

/// Complete lesson definition with pedagogical structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct LessonPlan {
    pub topic: String,
    pub level: LearnerLevel,
    pub audience: String,
    /// Approximate duration per lesson, in minutes
    pub estimated_duration_minutes: u32,
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub sections: Vec<LessonSection>,
    #[serde(default)]
    pub recommended_resources: Vec<ReferenceResource>,
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
}

impl LessonPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.estimated_duration_minutes == 0 {
            return Err(ValidationError::ZeroDuration {
                lesson: self.topic.clone(),
            });
        }
        if self.learning_objectives.is_empty() {
            return Err(ValidationError::EmptyObjectives {
                lesson: self.topic.clone(),
            });
        }
        if self.sections.is_empty() {
            return Err(ValidationError::EmptySections {
                lesson: self.topic.clone(),
            });
        }
        for section in &self.sections {
            section.validate()?;
        }
        for source in &self.sources {
            if source.description.trim().is_empty() {
                return Err(ValidationError::EmptyCitationDescription {
                    source_id: source.source_id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Collection of lessons tied to a topic and learner level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct LessonPlanBundle {
    pub topic: String,
    pub level: LearnerLevel,
    pub audience: String,
    pub lessons: Vec<LessonPlan>,
}

impl LessonPlanBundle {
    /// Check every structural invariant of the document model.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lessons.is_empty() {
            return Err(ValidationError::EmptyBundle);
        }
        self.lessons.iter().try_for_each(LessonPlan::validate)
    }

    /// Pretty-printed JSON Schema of the bundle, embedded in synthesis prompts.
    pub fn json_schema_string() -> String {
        let schema = schemars::schema_for!(LessonPlanBundle);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}

/// Parse a string as an absolute http(s)-style URL.
pub fn parse_absolute_url(raw: &str) -> Result<Url, ValidationError> {
    Url::parse(raw.trim()).map_err(|e| ValidationError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
