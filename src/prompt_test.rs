use super::*;

fn options(style: &str, color: &str, lighting: &str, composition: &str) -> PromptOptions {
    PromptOptions {
        style: Some(style.into()),
        color_scheme: Some(color.into()),
        lighting: Some(lighting.into()),
        composition: Some(composition.into()),
    }
}

#[test]
fn compose_appends_in_fixed_order() {
    let out = compose("a cat", &options("anime", "warm", "neon", "close-up"));
    let style = out.find("anime style").unwrap();
    let color = out.find("warm colors").unwrap();
    let light = out.find("neon lighting").unwrap();
    let comp = out.find("close-up shot").unwrap();
    assert!(out.starts_with("a cat, anime style"));
    assert!(style < color && color < light && light < comp);
}

#[test]
fn compose_skips_none_and_unknown() {
    let out = compose("a cat", &options("none", "sepia", "", "birds-eye"));
    assert_eq!(out, "a cat, bird's eye view, overhead perspective, aerial view");
}

#[test]
fn compose_without_options_is_trimmed_text() {
    assert_eq!(compose("  a cat  ", &PromptOptions::default()), "a cat");
}

#[test]
fn compose_blank_text_stays_empty() {
    assert_eq!(compose("   ", &options("anime", "warm", "neon", "close-up")), "");
}

#[test]
fn style_id_defaults_to_none() {
    assert_eq!(PromptOptions::default().style_id(), NONE);
    assert_eq!(options("vintage", "", "", "").style_id(), "vintage");
}

#[tokio::test]
async fn build_prompt_translates_then_composes() {
    let translator = Translator::with_services(Vec::new());
    let built = build_prompt(&translator, "一只猫", &options("realistic", "none", "none", "none")).await;
    assert!(built.text.starts_with("一只cat, photorealistic"));
    assert_eq!(built.translation, Some(TranslationMethod::Dictionary));
}

#[tokio::test]
async fn build_prompt_blank_input_short_circuits() {
    let translator = Translator::with_services(Vec::new());
    let built = build_prompt(&translator, " \n ", &options("anime", "warm", "neon", "close-up")).await;
    assert!(built.text.is_empty());
    assert!(built.translation.is_none());
}

#[test]
fn enhance_appends_keywords() {
    assert_eq!(enhance(" a cat "), "a cat, masterpiece, best quality, ultra detailed");
    assert_eq!(enhance("  "), "  ");
}

#[test]
fn smart_defaults_to_art_history() {
    assert_eq!(smart_optimize("a teapot"), "a teapot, masterpiece, best quality, in the style of Van Gogh");
}

#[test]
fn smart_detects_character() {
    assert_eq!(
        smart_optimize("An old Woman reading"),
        "An old Woman reading, masterpiece, best quality, detailed facial features, in the style of Van Gogh"
    );
    assert!(smart_optimize("一个人在街上").contains("detailed facial features"));
}

#[test]
fn smart_detects_scene() {
    assert_eq!(
        smart_optimize("mountain landscape"),
        "mountain landscape, masterpiece, best quality, atmospheric perspective, in the style of Van Gogh"
    );
    assert!(smart_optimize("夜晚的场景").contains("atmospheric perspective"));
}

#[test]
fn smart_photo_replaces_art_history() {
    let out = smart_optimize("street photo of a man");
    assert_eq!(
        out,
        "street photo of a man, masterpiece, best quality, detailed facial features, professional photography"
    );
    assert!(!out.contains("Van Gogh"));
    assert!(smart_optimize("婚纱摄影").ends_with("professional photography"));
}

#[test]
fn art_history_appends_one_known_style() {
    for _ in 0..20 {
        let out = add_art_history_style(" a vase ");
        let suffix = out.strip_prefix("a vase, ").unwrap();
        assert!(ART_HISTORY_STYLES.contains(&suffix), "{out}");
    }
}

#[test]
fn photo_enhancement_appends_two_terms() {
    assert_eq!(add_photo_enhancement("a dog"), "a dog, professional photography, studio lighting");
}

#[test]
fn every_mode_leaves_blank_input_alone() {
    for mode in [EnhanceMode::Keywords, EnhanceMode::Smart, EnhanceMode::ArtHistory, EnhanceMode::Photo] {
        assert_eq!(enhance_with(" ", mode), " ");
    }
}

#[test]
fn mode_parses_from_kebab_case() {
    let mode: EnhanceMode = serde_json::from_value(serde_json::json!("art-history")).unwrap();
    assert_eq!(mode, EnhanceMode::ArtHistory);
    assert_eq!(enhance_with("x", EnhanceMode::default()), enhance("x"));
}

#[test]
fn random_prompt_is_from_catalogue() {
    for _ in 0..20 {
        assert!(RANDOM_PROMPTS.contains(&random_prompt()));
    }
}

#[test]
fn preset_ids_are_unique_per_table() {
    for table in [STYLES, COLOR_SCHEMES, LIGHTING, COMPOSITIONS] {
        let mut ids: Vec<_> = table.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), table.len());
        assert!(!ids.contains(&NONE));
    }
}
