//! Prompt builder: translated user text plus preset and modifier phrases.
//!
//! DESIGN
//! ======
//! Order is fixed: text, style, colour, lighting, composition, each joined
//! with ", ". A modifier is skipped when absent, set to `none`, or unknown.
//! Blank input builds an empty prompt and never reaches the translator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::translate::{TranslationMethod, Translator};

/// Selector value meaning "no modifier".
pub const NONE: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub phrase: &'static str,
}

const fn preset(id: &'static str, name: &'static str, phrase: &'static str) -> Preset {
    Preset { id, name, phrase }
}

pub const STYLES: &[Preset] = &[
    preset("realistic", "Photorealistic", "photorealistic, professional photography, high quality, detailed, masterpiece"),
    preset("artistic", "Fine art", "oil painting, artistic style, fine art, masterpiece, detailed brushwork, classical"),
    preset("anime", "Anime", "anime style, manga art, japanese animation, vibrant colors, detailed, high quality"),
    preset("cinematic", "Cinematic", "cinematic lighting, movie scene, dramatic composition, film grain, atmospheric"),
    preset("minimalist", "Minimalist", "minimalist style, clean design, simple composition, modern art, elegant"),
    preset("fantasy", "Fantasy", "fantasy art, magical, ethereal, mystical atmosphere, epic fantasy, enchanting"),
    preset("cyberpunk", "Cyberpunk", "cyberpunk style, neon lights, futuristic, high tech, sci-fi, digital art"),
    preset("vintage", "Vintage", "vintage style, retro aesthetic, aged photo, nostalgic atmosphere, classic"),
];

pub const COLOR_SCHEMES: &[Preset] = &[
    preset("warm", "Warm", "warm colors, golden tones, cozy atmosphere"),
    preset("cool", "Cool", "cool colors, blue tones, calm atmosphere"),
    preset("monochrome", "Monochrome", "monochrome, black and white, high contrast"),
    preset("vibrant", "Vibrant", "vibrant colors, saturated, bold palette"),
    preset("pastel", "Pastel", "pastel colors, soft tones, gentle palette"),
];

pub const LIGHTING: &[Preset] = &[
    preset("golden-hour", "Golden hour", "golden hour lighting, warm sunlight, soft shadows"),
    preset("studio", "Studio", "studio lighting, professional setup, even illumination"),
    preset("dramatic", "Dramatic", "dramatic lighting, strong contrast, moody atmosphere"),
    preset("soft", "Soft", "soft lighting, diffused light, gentle illumination"),
    preset("neon", "Neon", "neon lighting, vibrant glow, cyberpunk atmosphere"),
];

pub const COMPOSITIONS: &[Preset] = &[
    preset("rule-of-thirds", "Rule of thirds", "rule of thirds composition, balanced layout"),
    preset("symmetrical", "Symmetrical", "symmetrical composition, balanced, centered"),
    preset("close-up", "Close-up", "close-up shot, detailed focus, intimate perspective"),
    preset("wide-shot", "Wide shot", "wide shot, expansive view, environmental context"),
    preset("birds-eye", "Bird's eye", "bird's eye view, overhead perspective, aerial view"),
];

pub const ENHANCEMENT_KEYWORDS: &[&str] = &[
    "masterpiece",
    "best quality",
    "ultra detailed",
    "8k resolution",
    "professional",
    "artistic",
    "cinematic lighting",
    "perfect composition",
];

pub const ART_HISTORY_STYLES: &[&str] = &[
    "in the style of Van Gogh",
    "Renaissance painting style",
    "Impressionist technique",
    "Art Nouveau design",
    "Baroque dramatic lighting",
    "Minimalist modern art",
];

pub const PHOTO_ENHANCEMENTS: &[&str] = &[
    "professional photography",
    "studio lighting",
    "shallow depth of field",
    "golden hour lighting",
    "high contrast",
    "ultra sharp details",
];

pub const SCENE_ENHANCEMENTS: &[&str] = &[
    "atmospheric perspective",
    "cinematic composition",
    "dramatic sky",
    "volumetric lighting",
    "magical atmosphere",
    "epic landscape",
];

pub const CHARACTER_ENHANCEMENTS: &[&str] = &[
    "detailed facial features",
    "expressive eyes",
    "dynamic pose",
    "elegant posture",
    "realistic skin texture",
    "professional portrait",
];

const CHARACTER_CUES: &[&str] = &["人", "woman", "man", "person"];
const SCENE_CUES: &[&str] = &["风景", "landscape", "场景", "scene"];
const PHOTO_CUES: &[&str] = &["摄影", "photo", "camera"];

pub const RANDOM_PROMPTS: &[&str] = &[
    "优雅的芭蕾舞者在舞台上翩翩起舞",
    "古典音乐厅中的大提琴演奏",
    "印象派风格的塞纳河畔咖啡厅",
    "文艺复兴时期的艺术工作室",
    "东方水墨画中的山水意境",
    "现代艺术画廊的雕塑展示",
    "古典建筑的光影交错",
    "艺术家手中的调色板",
    "博物馆中的名画欣赏",
    "工作室中的陶艺创作",
];

/// Modifier selections, each an id from the tables above or `none`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOptions {
    pub style: Option<String>,
    pub color_scheme: Option<String>,
    pub lighting: Option<String>,
    pub composition: Option<String>,
}

impl PromptOptions {
    /// Style id for display and history; `none` when unset.
    #[must_use]
    pub fn style_id(&self) -> &str {
        self.style.as_deref().filter(|s| !s.is_empty()).unwrap_or(NONE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    /// Final prompt for the generator; empty when the input was blank.
    pub text: String,
    pub translation: Option<TranslationMethod>,
}

fn lookup(table: &'static [Preset], id: Option<&str>) -> Option<&'static str> {
    let id = id?.trim();
    if id.is_empty() || id == NONE {
        return None;
    }
    table.iter().find(|p| p.id == id).map(|p| p.phrase)
}

/// Append the selected phrases to already-translated text. Pure.
#[must_use]
pub fn compose(text: &str, options: &PromptOptions) -> String {
    let mut out = text.trim().to_string();
    if out.is_empty() {
        return out;
    }
    let phrases = [
        lookup(STYLES, options.style.as_deref()),
        lookup(COLOR_SCHEMES, options.color_scheme.as_deref()),
        lookup(LIGHTING, options.lighting.as_deref()),
        lookup(COMPOSITIONS, options.composition.as_deref()),
    ];
    for phrase in phrases.into_iter().flatten() {
        out.push_str(", ");
        out.push_str(phrase);
    }
    out
}

/// Translate `user_text` and append modifier phrases.
pub async fn build_prompt(translator: &Translator, user_text: &str, options: &PromptOptions) -> BuiltPrompt {
    let trimmed = user_text.trim();
    if trimmed.is_empty() {
        return BuiltPrompt { text: String::new(), translation: None };
    }
    let translation = translator.translate(trimmed).await;
    BuiltPrompt { text: compose(&translation.text, options), translation: translation.method }
}

/// How `POST /api/prompt/enhance` rewrites a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnhanceMode {
    /// Fixed quality keywords.
    #[default]
    Keywords,
    /// Keywords picked from what the prompt is about.
    Smart,
    /// One random art-history style.
    ArtHistory,
    /// Photography terms.
    Photo,
}

/// Apply `mode`. Blank input is returned unchanged in every mode.
#[must_use]
pub fn enhance_with(prompt: &str, mode: EnhanceMode) -> String {
    match mode {
        EnhanceMode::Keywords => enhance(prompt),
        EnhanceMode::Smart => smart_optimize(prompt),
        EnhanceMode::ArtHistory => add_art_history_style(prompt),
        EnhanceMode::Photo => add_photo_enhancement(prompt),
    }
}

fn append(prompt: &str, phrases: &[&str]) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return prompt.to_string();
    }
    format!("{trimmed}, {}", phrases.join(", "))
}

/// Append the first three enhancement keywords.
#[must_use]
pub fn enhance(prompt: &str) -> String {
    append(prompt, &ENHANCEMENT_KEYWORDS[..3])
}

/// Two quality keywords, then one phrase per detected subject: character,
/// scene, and either photography or (otherwise) an art-history style.
#[must_use]
pub fn smart_optimize(prompt: &str) -> String {
    let lower = prompt.to_lowercase();
    let mentions = |cues: &[&str]| cues.iter().any(|c| lower.contains(c));

    let mut phrases = ENHANCEMENT_KEYWORDS[..2].to_vec();
    if mentions(CHARACTER_CUES) {
        phrases.push(CHARACTER_ENHANCEMENTS[0]);
    }
    if mentions(SCENE_CUES) {
        phrases.push(SCENE_ENHANCEMENTS[0]);
    }
    if mentions(PHOTO_CUES) {
        phrases.push(PHOTO_ENHANCEMENTS[0]);
    } else {
        phrases.push(ART_HISTORY_STYLES[0]);
    }
    append(prompt, &phrases)
}

#[must_use]
pub fn add_art_history_style(prompt: &str) -> String {
    let idx = rand::rng().random_range(0..ART_HISTORY_STYLES.len());
    append(prompt, &ART_HISTORY_STYLES[idx..=idx])
}

#[must_use]
pub fn add_photo_enhancement(prompt: &str) -> String {
    append(prompt, &PHOTO_ENHANCEMENTS[..2])
}

#[must_use]
pub fn random_prompt() -> &'static str {
    let idx = rand::rng().random_range(0..RANDOM_PROMPTS.len());
    RANDOM_PROMPTS[idx]
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
