//! Integration tests for course content generation.
//!
//! Generates the complete standard course through the template path and
//! checks that every element satisfies its per-kind specification, without
//! going through the delivery pipeline.

use forge_content::catalog::standard_course;
use forge_content::{
    validate, ContentGenerator, ElementKind, GenerationSource, SpecTable,
};

#[test]
fn test_standard_catalog_shape() {
    let tree = standard_course();
    assert!(tree.check_shape().is_ok());
    assert_eq!(tree.units.len(), 5);
    assert_eq!(tree.theme_count(), 15);
    assert_eq!(tree.element_count(), 75);

    for theme in tree.themes() {
        assert_eq!(
            theme.concepts.len(),
            5,
            "theme {} should carry 5 concepts",
            theme.code
        );
        assert_eq!(
            theme.code,
            format!("{}.{}", theme.unit_number, theme.theme_number)
        );
    }
}

#[tokio::test]
async fn test_every_template_element_validates() {
    let tree = standard_course();
    let specs = SpecTable::standard();
    let generator = ContentGenerator::template_only();

    for theme in tree.themes() {
        for kind in ElementKind::ALL {
            let spec = specs.get(kind);
            let instance = generator.generate(theme, spec).await;
            let result = validate(&instance, spec, &theme.code);
            assert!(
                result.valid,
                "{kind} for theme {} failed validation: {:?}",
                theme.code, result.errors
            );
            assert_eq!(instance.provenance.source, GenerationSource::Template);
            assert_eq!(instance.provenance.attempts, 1);
        }
    }
}

#[tokio::test]
async fn test_word_bands_hold_after_repair() {
    let tree = standard_course();
    let specs = SpecTable::standard();
    let generator = ContentGenerator::template_only();
    let theme = tree.themes().next().expect("first theme");

    for kind in [
        ElementKind::Narrative,
        ElementKind::AcademicText,
        ElementKind::VideoScript,
    ] {
        let spec = specs.get(kind);
        let band = spec.word_band.expect("kind has a word band");
        let instance = generator.generate(theme, spec).await;
        assert!(
            band.contains(instance.metrics.words),
            "{kind}: {} words outside {}..={}",
            instance.metrics.words,
            band.min(),
            band.max()
        );
    }
}

#[tokio::test]
async fn test_per_kind_metrics_are_measured() {
    let tree = standard_course();
    let specs = SpecTable::standard();
    let generator = ContentGenerator::template_only();
    let theme = tree.themes().next().expect("first theme");

    let narrative = generator
        .generate(theme, specs.get(ElementKind::Narrative))
        .await;
    assert_eq!(narrative.metrics.character.as_deref(), Some("Elena Martínez"));
    assert!(narrative.metrics.concepts.expect("concepts") >= 3);

    let academic = generator
        .generate(theme, specs.get(ElementKind::AcademicText))
        .await;
    assert!(academic.metrics.references.expect("references") >= 3);

    let video = generator
        .generate(theme, specs.get(ElementKind::VideoScript))
        .await;
    assert!(video.metrics.visuals.expect("visuals") >= 2);

    let infographic = generator
        .generate(theme, specs.get(ElementKind::Infographic))
        .await;
    let panels = infographic.metrics.panels.expect("panels");
    assert!((4..=6).contains(&panels));
    assert_eq!(infographic.metrics.width_px, Some(1200));
    assert_eq!(infographic.metrics.height_px, Some(900));

    let activity = generator
        .generate(theme, specs.get(ElementKind::Activity))
        .await;
    assert_eq!(activity.metrics.duration_minutes, Some(60));
    let rubric = activity.metrics.rubric_criteria.expect("rubric");
    assert!((4..=5).contains(&rubric));
    assert!(activity.metrics.deliverables.expect("deliverables") >= 1);
}

#[tokio::test]
async fn test_titles_name_kind_and_theme() {
    let tree = standard_course();
    let specs = SpecTable::standard();
    let generator = ContentGenerator::template_only();
    let theme = tree
        .themes()
        .find(|t| t.code == "3.2")
        .expect("theme 3.2 exists");

    for kind in ElementKind::ALL {
        let instance = generator.generate(theme, specs.get(kind)).await;
        assert!(
            instance.title.contains(&theme.title) || instance.title.contains("3.2"),
            "{kind} title should reference its theme: {}",
            instance.title
        );
        assert!(!instance.body.is_empty());
    }
}
