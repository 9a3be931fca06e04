//! Generation gateway: validate, pick a model variant, call upstream, normalize.
//!
//! DESIGN
//! ======
//! The gateway is an explicitly constructed handle holding the provider
//! client. Without a credential it still exists but answers every call with
//! [`GatewayError::Configuration`] once input validation has passed.
//!
//! A reference image selects the reference-conditioned variant, which only
//! produces one image shaped like its source, so the output count and aspect
//! ratio the caller asked for are overridden.
//!
//! Exactly one upstream call per request. No retries, no caching.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use super::normalize::{NormalizeError, normalize};
use crate::error::{ErrorCode, Locale};
use crate::upstream::classify::{FailureKind, classify};
use crate::upstream::config::UpstreamConfig;
use crate::upstream::{self, ImageModel, UpstreamError};

pub const DEFAULT_GUIDANCE: f64 = 2.5;
pub const DEFAULT_STEPS: u32 = 28;
pub const DEFAULT_OUTPUT_QUALITY: u8 = 80;
pub const MAX_OUTPUT_COUNT: u8 = 4;
pub const DEFAULT_SAFETY_TOLERANCE: i64 = 2;
pub const MAX_SAFETY_TOLERANCE: i64 = 6;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Output aspect ratio. `MatchSource` keeps the reference image proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    StandardTall,
    #[serde(rename = "21:9")]
    UltraWide,
    #[serde(rename = "2:3")]
    Photo,
    #[serde(rename = "3:2")]
    PhotoWide,
    #[serde(rename = "match_input_image")]
    MatchSource,
}

impl AspectRatio {
    /// Parse a caller-supplied ratio. Unknown values fall back to square.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "16:9" => Self::Wide,
            "9:16" => Self::Tall,
            "4:3" => Self::Standard,
            "3:4" => Self::StandardTall,
            "21:9" => Self::UltraWide,
            "2:3" => Self::Photo,
            "3:2" => Self::PhotoWide,
            _ => Self::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Webp,
    #[serde(alias = "jpeg")]
    Jpg,
    Png,
}

impl OutputFormat {
    /// Parse a caller-supplied format, or `None` if unknown.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "webp" => Some(Self::Webp),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Base64 data URI of the reference image.
    pub reference_image: Option<String>,
    pub aspect_ratio: AspectRatio,
    pub guidance: f64,
    pub steps: u32,
    /// 1–100.
    pub output_quality: u8,
    pub output_format: OutputFormat,
    pub go_fast: bool,
    pub seed: Option<i64>,
    /// 1–4.
    pub output_count: u8,
}

impl GenerationRequest {
    /// A text-only request with default parameters.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_image: None,
            aspect_ratio: AspectRatio::default(),
            guidance: DEFAULT_GUIDANCE,
            steps: DEFAULT_STEPS,
            output_quality: DEFAULT_OUTPUT_QUALITY,
            output_format: OutputFormat::default(),
            go_fast: true,
            seed: None,
            output_count: 1,
        }
    }
}

/// A validated reference-image edit request.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub prompt: String,
    pub input_image: String,
    pub aspect_ratio: AspectRatio,
    /// Clamped to 0–6.
    pub safety_tolerance: i64,
    pub output_format: OutputFormat,
}

// =============================================================================
// UPSTREAM INPUT
// =============================================================================

/// Input object sent to the provider for a generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInput {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_image: Option<String>,
    pub aspect_ratio: AspectRatio,
    pub guidance: f64,
    pub num_inference_steps: u32,
    pub output_quality: u8,
    pub output_format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_fast: Option<bool>,
    pub num_outputs: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditInput {
    pub prompt: String,
    pub input_image: String,
    pub aspect_ratio: AspectRatio,
    pub safety_tolerance: i64,
    pub output_format: OutputFormat,
}

/// Which model to call and with what input.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    pub model: String,
    pub input: ModelInput,
}

/// Images produced by one gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub model: String,
    /// Never empty.
    pub image_urls: Vec<String>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// What was wrong with the caller's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputProblem {
    MissingPrompt,
    MissingInstruction,
    MissingText,
    PromptTooLong { max: usize },
    InvalidReferenceImage,
    MissingReferenceImage,
    SafetyTolerance,
    UnsupportedImage,
    MalformedBody(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid input: {0:?}")]
    InvalidInput(InputProblem),
    #[error("gateway not configured: upstream credential missing")]
    Configuration,
    #[error("upstream rejected credentials: {0}")]
    Auth(String),
    #[error("upstream timed out: {0}")]
    Timeout(String),
    #[error("upstream quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("unrecognized upstream output: {0}")]
    UpstreamFormat(String),
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    #[error("upstream error: {0}")]
    Unknown(String),
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::Configuration => "E_CONFIGURATION",
            Self::Auth(_) => "E_AUTH",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::QuotaExceeded(_) => "E_QUOTA_EXCEEDED",
            Self::ModelUnavailable(_) => "E_MODEL_UNAVAILABLE",
            Self::UpstreamFormat(_) => "E_UPSTREAM_FORMAT",
            Self::GenerationFailed(_) => "E_GENERATION_FAILED",
            Self::Unknown(_) => "E_UNKNOWN",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ModelUnavailable(_) | Self::GenerationFailed(_) | Self::Unknown(_))
    }
}

impl GatewayError {
    /// HTTP status the error maps to.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Auth(_) => 401,
            Self::Timeout(_) => 408,
            Self::QuotaExceeded(_) => 429,
            Self::ModelUnavailable(_) => 503,
            Self::Configuration | Self::UpstreamFormat(_) | Self::GenerationFailed(_) | Self::Unknown(_) => 500,
        }
    }

    /// Quota failures come with an upgrade offer in the UI.
    #[must_use]
    pub fn upsell(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }

    /// Single human-readable message for the end user.
    #[must_use]
    pub fn user_message(&self, locale: Locale) -> String {
        let zh = locale == Locale::Zh;
        let pick = |en: &str, cn: &str| if zh { cn.to_string() } else { en.to_string() };
        match self {
            Self::InvalidInput(problem) => problem.user_message(locale),
            Self::Configuration => {
                pick("Service configuration error, please contact the administrator.", "服务配置错误，请联系管理员")
            }
            Self::Auth(_) => pick("Invalid API token, please check the configuration.", "API Token 无效，请检查配置"),
            Self::Timeout(_) => pick("Generation timed out, please retry.", "生成超时，请重试"),
            Self::QuotaExceeded(_) => pick(
                "API quota exhausted, please check the provider account balance.",
                "API 配额不足，请检查账户余额",
            ),
            Self::ModelUnavailable(_) => pick("Model unavailable, please retry later.", "模型不可用，请稍后重试"),
            Self::UpstreamFormat(_) => pick("The image service returned an unknown format.", "未知的返回格式"),
            Self::GenerationFailed(_) => pick("Image generation failed, please retry.", "图像生成失败，请重试"),
            Self::Unknown(raw) => {
                if zh {
                    format!("生成失败: {raw}")
                } else {
                    format!("Generation failed: {raw}")
                }
            }
        }
    }
}

impl InputProblem {
    #[must_use]
    pub fn user_message(&self, locale: Locale) -> String {
        let zh = locale == Locale::Zh;
        match self {
            Self::MissingPrompt if zh => "请提供有效的提示词".into(),
            Self::MissingPrompt => "Please provide a valid prompt.".into(),
            Self::MissingInstruction if zh => "请提供有效的编辑指令".into(),
            Self::MissingInstruction => "Please provide a valid edit instruction.".into(),
            Self::MissingText if zh => "请提供需要翻译的文本".into(),
            Self::MissingText => "Text is required.".into(),
            Self::PromptTooLong { max } if zh => format!("提示词长度不能超过{max}个字符"),
            Self::PromptTooLong { max } => format!("Prompt must not exceed {max} characters."),
            Self::InvalidReferenceImage if zh => "参考图像格式无效".into(),
            Self::InvalidReferenceImage => "Reference image must be a data URI string.".into(),
            Self::MissingReferenceImage if zh => "请提供有效的输入图像".into(),
            Self::MissingReferenceImage => "Please provide a valid input image.".into(),
            Self::SafetyTolerance if zh => "安全等级设置错误，请使用0-6之间的值".into(),
            Self::SafetyTolerance => "Safety tolerance must be between 0 and 6.".into(),
            Self::UnsupportedImage if zh => "输入图像格式不支持，请使用 JPEG, PNG, GIF 或 WebP 格式".into(),
            Self::UnsupportedImage => "Input image format not supported; use JPEG, PNG, GIF or WebP.".into(),
            Self::MalformedBody(detail) if zh => format!("请求格式错误: {detail}"),
            Self::MalformedBody(detail) => format!("Malformed request body: {detail}"),
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        let detail = err.to_string();
        match classify(&err) {
            FailureKind::Auth => Self::Auth(detail),
            FailureKind::Timeout => Self::Timeout(detail),
            FailureKind::Quota => Self::QuotaExceeded(detail),
            FailureKind::ModelUnavailable => Self::ModelUnavailable(detail),
            FailureKind::Unknown => Self::Unknown(err.detail().to_string()),
        }
    }
}

impl From<NormalizeError> for GatewayError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Format(_) | NormalizeError::Stream(_) => Self::UpstreamFormat(err.to_string()),
            NormalizeError::Failed(_) => Self::GenerationFailed(err.to_string()),
        }
    }
}

/// Edit-specific provider complaints about our input, checked before the
/// general classification.
fn edit_error(err: UpstreamError) -> GatewayError {
    let detail = err.detail();
    if detail.contains("safety_tolerance") {
        GatewayError::InvalidInput(InputProblem::SafetyTolerance)
    } else if detail.contains("input_image") {
        GatewayError::InvalidInput(InputProblem::UnsupportedImage)
    } else {
        GatewayError::from(err)
    }
}

/// Prompt must be non-blank and at most `max_chars` characters.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] otherwise.
pub fn validate_prompt(prompt: &str, max_chars: usize) -> Result<(), GatewayError> {
    if prompt.trim().is_empty() {
        return Err(GatewayError::InvalidInput(InputProblem::MissingPrompt));
    }
    if prompt.chars().count() > max_chars {
        return Err(GatewayError::InvalidInput(InputProblem::PromptTooLong { max: max_chars }));
    }
    Ok(())
}

// =============================================================================
// GATEWAY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub text_model: String,
    pub reference_model: String,
    pub max_prompt_chars: usize,
}

pub struct Gateway {
    model: Option<Arc<dyn ImageModel>>,
    settings: GatewaySettings,
}

impl Gateway {
    /// Build the gateway from provider config. A missing credential yields an
    /// unconfigured gateway rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn init(config: &UpstreamConfig, max_prompt_chars: usize) -> Result<Self, UpstreamError> {
        let model = upstream::connect(config)?;
        let settings = GatewaySettings {
            text_model: config.text_model.clone(),
            reference_model: config.reference_model.clone(),
            max_prompt_chars,
        };
        Ok(Self::with_model(model, settings))
    }

    #[must_use]
    pub fn with_model(model: Option<Arc<dyn ImageModel>>, settings: GatewaySettings) -> Self {
        Self { model, settings }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Choose the model variant and build its input. Pure.
    #[must_use]
    pub fn plan(&self, req: &GenerationRequest) -> UpstreamCall {
        let seed = req.seed.filter(|s| *s != 0);
        let output_quality = req.output_quality.clamp(1, 100);
        match &req.reference_image {
            Some(image) => UpstreamCall {
                model: self.settings.reference_model.clone(),
                input: ModelInput {
                    prompt: req.prompt.clone(),
                    input_image: Some(image.clone()),
                    aspect_ratio: AspectRatio::MatchSource,
                    guidance: req.guidance,
                    num_inference_steps: req.steps,
                    output_quality,
                    output_format: req.output_format,
                    go_fast: None,
                    num_outputs: 1,
                    seed,
                },
            },
            None => UpstreamCall {
                model: self.settings.text_model.clone(),
                input: ModelInput {
                    prompt: req.prompt.clone(),
                    input_image: None,
                    aspect_ratio: match req.aspect_ratio {
                        AspectRatio::MatchSource => AspectRatio::Square,
                        other => other,
                    },
                    guidance: req.guidance,
                    num_inference_steps: req.steps,
                    output_quality,
                    output_format: req.output_format,
                    go_fast: Some(req.go_fast),
                    num_outputs: req.output_count.clamp(1, MAX_OUTPUT_COUNT),
                    seed,
                },
            },
        }
    }

    /// Run one generation.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`]; input problems are reported before the
    /// configuration check and before any upstream call.
    pub async fn generate(&self, req: &GenerationRequest) -> Result<Generation, GatewayError> {
        validate_prompt(&req.prompt, self.settings.max_prompt_chars)?;
        self.dispatch(req).await
    }

    /// [`Gateway::generate`] for callers that have already checked the
    /// prompt against their own length bound. A blank prompt is still
    /// rejected.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn dispatch(&self, req: &GenerationRequest) -> Result<Generation, GatewayError> {
        if req.prompt.trim().is_empty() {
            return Err(GatewayError::InvalidInput(InputProblem::MissingPrompt));
        }
        if req.reference_image.as_deref().is_some_and(str::is_empty) {
            return Err(GatewayError::InvalidInput(InputProblem::InvalidReferenceImage));
        }
        let model = self.model.as_ref().ok_or(GatewayError::Configuration)?;

        let call = self.plan(req);
        info!(
            model = %call.model,
            prompt_len = call.input.prompt.len(),
            outputs = call.input.num_outputs,
            has_reference = call.input.input_image.is_some(),
            "gateway: generation requested"
        );
        let input = to_value(&call.input)?;

        let result = match model.run(&call.model, &input).await {
            Ok(raw) => normalize(raw).await.map_err(GatewayError::from),
            Err(e) => Err(GatewayError::from(e)),
        };
        match result {
            Ok(image_urls) => {
                info!(model = %call.model, images = image_urls.len(), "gateway: generation succeeded");
                Ok(Generation { model: call.model, image_urls })
            }
            Err(e) => {
                error!(model = %call.model, code = e.error_code(), error = %e, "gateway: generation failed");
                Err(e)
            }
        }
    }

    /// Edit a reference image with an instruction. Returns the first image.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn edit(&self, req: &EditRequest) -> Result<String, GatewayError> {
        validate_prompt(&req.prompt, self.settings.max_prompt_chars)?;
        if req.input_image.is_empty() {
            return Err(GatewayError::InvalidInput(InputProblem::MissingReferenceImage));
        }
        let model = self.model.as_ref().ok_or(GatewayError::Configuration)?;

        let input = EditInput {
            prompt: req.prompt.clone(),
            input_image: req.input_image.clone(),
            aspect_ratio: req.aspect_ratio,
            safety_tolerance: req.safety_tolerance.clamp(0, MAX_SAFETY_TOLERANCE),
            output_format: req.output_format,
        };
        let model_id = &self.settings.reference_model;
        info!(model = %model_id, prompt_len = input.prompt.len(), "gateway: edit requested");
        let input = to_value(&input)?;

        let result = match model.run(model_id, &input).await {
            Ok(raw) => normalize(raw).await.map_err(GatewayError::from),
            Err(e) => Err(edit_error(e)),
        };
        match result {
            Ok(urls) => urls
                .into_iter()
                .next()
                .ok_or_else(|| GatewayError::GenerationFailed("no image returned".into())),
            Err(e) => {
                error!(model = %model_id, code = e.error_code(), error = %e, "gateway: edit failed");
                Err(e)
            }
        }
    }
}

fn to_value(input: &impl Serialize) -> Result<Value, GatewayError> {
    serde_json::to_value(input).map_err(|e| GatewayError::Unknown(format!("input serialization: {e}")))
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
