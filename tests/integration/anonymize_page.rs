use pdxanon::policy::{CharWhitelist, StopWords};
use pdxanon::{
    AnonymizerConfig, CharacterMap, DrawOp, Outcome, PageDump, PolicyFilter, RedactionScope, RenderedPage, WordList,
    ZoneWhitelist,
};

use crate::fixtures::{engine, page_dump, run_page, string_of, text_ops, INVOICE, TOTAL};

fn same_class(a: char, b: char) -> bool {
    (a.is_ascii_lowercase() && b.is_ascii_lowercase())
        || (a.is_ascii_uppercase() && b.is_ascii_uppercase())
        || (a.is_ascii_digit() && b.is_ascii_digit())
        || (!a.is_ascii_alphanumeric() && a == b)
}

#[test]
fn test_page_text_is_replaced_shape_for_shape() {
    let dump = page_dump();
    let (ops, engine) = run_page(&dump, engine(AnonymizerConfig::default(), PolicyFilter::default(), 2024));

    let texts = text_ops(&ops);
    assert_eq!(texts.len(), 3);
    for (out, original) in texts.iter().zip([INVOICE, INVOICE, TOTAL]) {
        let out = string_of(out);
        assert_ne!(out, original);
        assert_eq!(out.chars().count(), original.chars().count());
        for (o, r) in original.chars().zip(out.chars()) {
            assert!(same_class(o, r), "{:?} -> {:?} in {:?}", o, r, out);
        }
    }
    assert_eq!(engine.stats().exhausted, 0);
    assert_eq!(engine.stats().text_objects, 3);
}

#[test]
fn test_words_start_where_originals_started() {
    let dump = page_dump();
    let originals: Vec<_> = dump.ops.iter().filter_map(DrawOp::text).map(|t| t.to_vec()).collect();
    let (ops, _) = run_page(&dump, engine(AnonymizerConfig::default(), PolicyFilter::default(), 5));

    for (out, original) in text_ops(&ops).iter().zip(&originals) {
        assert_eq!(out[0].matrix, original[0].matrix);
        for i in 1..original.len() {
            if original[i - 1].unicode == ' ' {
                assert_eq!(out[i].matrix, original[i].matrix, "word at {}", i);
            }
        }
    }
}

#[test]
fn test_fill_and_clip_of_same_text_agree() {
    let (ops, engine) = run_page(&page_dump(), engine(AnonymizerConfig::default(), PolicyFilter::default(), 9));
    let texts = text_ops(&ops);
    assert_eq!(texts[0], texts[1]);

    let cached = engine.stats().outcomes.get(&Outcome::Cached).copied().unwrap_or(0);
    assert_eq!(cached, INVOICE.chars().count() as u64);
}

#[test]
fn test_same_seed_same_page() {
    let dump = page_dump();
    let (first, _) = run_page(&dump, engine(AnonymizerConfig::default(), PolicyFilter::default(), 77));
    let (second, _) = run_page(&dump, engine(AnonymizerConfig::default(), PolicyFilter::default(), 77));
    assert_eq!(first, second);
}

#[test]
fn test_zone_covering_page_keeps_everything() {
    let dump = page_dump();
    let config = AnonymizerConfig::default();
    let (width, height) = dump.pixel_size(config.resolution);
    let zones = ZoneWhitelist::parse(r#"[{"x1": 0, "y1": 0, "x2": 1, "y2": 1}]"#, width, height).unwrap();
    let (ops, engine) = run_page(&dump, engine(config, PolicyFilter::default().with_zones(zones), 1));

    let texts = text_ops(&ops);
    assert_eq!(string_of(texts[0]), INVOICE);
    assert_eq!(string_of(texts[2]), TOTAL);
    assert!(engine
        .records()
        .iter()
        .all(|r| matches!(r.outcome, Outcome::ZoneKept | Outcome::Cached)));
}

#[test]
fn test_word_scope_replaces_only_listed_names() {
    let stop_words = StopWords::parse("for\n");
    let words = WordList::parse("john smith\nfor\n", &stop_words);
    let config = AnonymizerConfig {
        scope: RedactionScope::Words,
        ..AnonymizerConfig::default()
    };
    let policy = PolicyFilter::new(
        ZoneWhitelist::default(),
        CharWhitelist::new(&config.char_whitelist),
        words,
        config.scope,
    );
    let (ops, _) = run_page(&page_dump(), engine(config, policy, 3));

    let texts = text_ops(&ops);
    let invoice = string_of(texts[0]);
    assert!(invoice.starts_with("Invoice 2024-117 for "));
    assert!(invoice.ends_with('.'));
    assert_ne!(&invoice[21..31], "John Smith");
    assert_eq!(string_of(texts[2]), TOTAL);
}

#[test]
fn test_unreadable_word_list_anonymizes_everything() {
    let words = WordList::load_or_default("/nonexistent/words.txt", &StopWords::default());
    let config = AnonymizerConfig {
        scope: RedactionScope::Words,
        ..AnonymizerConfig::default()
    };
    let policy = PolicyFilter::new(
        ZoneWhitelist::default(),
        CharWhitelist::new(&config.char_whitelist),
        words,
        config.scope,
    );
    let (ops, engine) = run_page(&page_dump(), engine(config, policy, 12));

    let texts = text_ops(&ops);
    assert_ne!(string_of(texts[0]), INVOICE);
    assert_ne!(string_of(texts[2]), TOTAL);
    assert_eq!(engine.stats().kept_chunks, 0);
    assert!(engine.stats().searched > 0);
}

#[test]
fn test_observed_pools_reuse_page_characters() {
    let dump = page_dump();
    let config = AnonymizerConfig {
        pool_source: pdxanon::PoolSource::Observed,
        ..AnonymizerConfig::default()
    };
    let mut survey = CharacterMap::default();
    dump.replay(&mut survey, config.resolution).unwrap();
    let seen = survey.chars("Body");

    let (ops, _) = run_page(&dump, engine(config, PolicyFilter::default(), 8).with_character_map(survey));
    for text in text_ops(&ops) {
        assert!(text.iter().all(|r| seen.contains(&r.unicode)));
    }
}

#[test]
fn test_highlights_follow_page() {
    let dump = page_dump();
    let config = AnonymizerConfig::default();
    let resolution = config.resolution;
    let mut device = pdxanon::AnonymizingDevice::new(
        pdxanon::RecordingSink::new(),
        engine(config, PolicyFilter::default(), 4),
    );
    dump.replay(&mut device, resolution).unwrap();
    let before = device.sink().len();
    let drawn = device.draw_highlights().unwrap();

    assert_eq!(drawn, device.engine().records().len());
    let overlay = &device.sink().ops()[before..];
    assert_eq!(overlay.len(), drawn);
    assert!(overlay
        .iter()
        .all(|op| matches!(op, DrawOp::FillPath { even_odd: true, alpha, .. } if *alpha == 0.3)));
}

#[test]
fn test_rendered_page_written_to_disk() {
    let dump = page_dump();
    let dir = tempfile::tempdir().unwrap();
    let dump_path = dir.path().join("page.json");
    std::fs::write(&dump_path, serde_json::to_string(&dump).unwrap()).unwrap();

    let loaded = PageDump::load(&dump_path).unwrap();
    let config = AnonymizerConfig::default();
    let resolution = config.resolution;
    let (ops, _) = run_page(&loaded, engine(config, PolicyFilter::default(), 6));
    let out_path = dir.path().join("out.json");
    RenderedPage::new(&loaded, resolution, ops.clone()).save(&out_path).unwrap();

    let back: RenderedPage = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(back.width, 2550.0);
    assert_eq!(back.height, 3300.0);
    assert_eq!(back.ops.len(), ops.len());
    assert_eq!(back.ops.last(), Some(&DrawOp::Close));
    let strings = |ops: &[DrawOp]| -> Vec<String> { text_ops(ops).into_iter().map(string_of).collect() };
    assert_eq!(strings(&back.ops), strings(&ops));
}
