//! pdxanon command-line interface
//! Created: 2026-10-03
//!
//! Anonymizes the text of one exported page dump and writes the device
//! calls of the anonymized rendering, optionally with a highlight overlay
//! and a run report.

use std::process;
use std::time::Instant;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use pdxanon::config::{AnonymizerConfig, ChunkingMode, ExhaustionPolicy, PoolSource, RedactionScope};
use pdxanon::error::ConfigError;
use pdxanon::policy::CharWhitelist;
use pdxanon::{
    AnonymizationEngine, AnonymizingDevice, CharacterMap, LogLevel, Logger, PageDump, PolicyFilter, RecordingSink,
    RenderSink, RenderedPage, Result, RunReport, StopWords, WordList, ZoneWhitelist,
};

fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches.get_one::<LogLevel>("verbose").copied().unwrap_or(LogLevel::Info);
    Logger::for_level(log_level).init();

    if let Err(e) = run(&matches) {
        error!("❌ Anonymization failed: {}", e);
        process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("pdxanon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Replace rendered page text with look-alike random text of identical geometry")
        .long_about(
            "Runs a page dump through the glyph-substitution anonymizer. Every glyph that is not \
             protected by a zone or character whitelist is replaced by a random character of the \
             same class, chosen so that each run of glyphs still ends where the original ended.",
        )
        // Input/Output
        .arg(Arg::new("input")
            .short('i')
            .long("input")
            .value_name("FILE")
            .help("Page dump (JSON) to anonymize")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Where to write the anonymized device calls (JSON)")
            .required(true))
        // Configuration
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("Configuration file (JSON/YAML)"))
        .arg(Arg::new("set")
            .long("set")
            .value_name("KEY=VALUE")
            .action(ArgAction::Append)
            .help("Override a configuration value, e.g. back_off_amount=2.0"))
        // Policy inputs
        .arg(Arg::new("zones")
            .short('z')
            .long("zones")
            .value_name("FILE")
            .help("Zone whitelist (JSON array of normalized rectangles)"))
        .arg(Arg::new("words")
            .short('w')
            .long("words")
            .value_name("FILE")
            .help("Word list; only matching words are anonymized"))
        .arg(Arg::new("stopwords")
            .long("stopwords")
            .value_name("FILE")
            .help("Words removed from the word list"))
        // Search behaviour
        .arg(Arg::new("scope")
            .long("scope")
            .value_parser(value_parser!(RedactionScope))
            .help("Anonymize everything or only word-list matches"))
        .arg(Arg::new("chunking")
            .long("chunking")
            .value_parser(value_parser!(ChunkingMode))
            .help("How text is split into substitution units"))
        .arg(Arg::new("pool-source")
            .long("pool-source")
            .value_parser(value_parser!(PoolSource))
            .help("Where replacement characters come from"))
        .arg(Arg::new("exhaustion")
            .long("exhaustion")
            .value_parser(value_parser!(ExhaustionPolicy))
            .help("What to do when a chunk runs out of attempts"))
        .arg(Arg::new("seed")
            .short('s')
            .long("seed")
            .value_name("N")
            .value_parser(value_parser!(u64))
            .help("Seed the random source for a reproducible run"))
        .arg(Arg::new("mask-images")
            .long("mask-images")
            .action(ArgAction::SetTrue)
            .help("Blank raster images"))
        .arg(Arg::new("highlight")
            .long("highlight")
            .action(ArgAction::SetTrue)
            .help("Append the substitution highlight overlay"))
        // Output and reporting
        .arg(Arg::new("report")
            .short('r')
            .long("report")
            .value_name("FILE")
            .help("Write a JSON run report"))
        // Logging
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(value_parser!(LogLevel))
            .default_value("info")
            .help("Set logging verbosity"))
}

fn run(matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "input")?;
    let output = required(matches, "output")?;

    let config = build_config(matches)?;
    let resolution = config.resolution;
    let seed = matches.get_one::<u64>("seed").copied();

    let dump = PageDump::load(&input)?;
    let (width, height) = dump.pixel_size(resolution);

    let policy = build_policy(matches, &config, width, height);
    display_config_summary(&config, &policy, &input, &output, seed);

    // survey pass: which characters each font shows on this page
    let mut survey = CharacterMap::default();
    dump.replay(&mut survey, resolution)?;

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let highlight = config.highlight;
    let engine = AnonymizationEngine::new(config, policy, rng).with_character_map(survey);
    let mut device = AnonymizingDevice::new(RecordingSink::new(), engine);

    let start_time = Instant::now();
    dump.replay(&mut device, resolution)?;
    let highlights = if highlight { device.draw_highlights()? } else { 0 };
    device.close()?;
    let duration = start_time.elapsed();

    let (sink, engine) = device.into_parts();
    RenderedPage::new(&dump, resolution, sink.into_ops()).save(&output)?;
    info!("✅ Anonymized page written to {} in {:.2?}", output, duration);

    let report = RunReport::from_engine(&engine, &input, &output, seed).with_highlights(highlights);
    info!("📊 {}", report.summary());
    if engine.stats().exhausted > 0 {
        warn!("⚠️  {} chunks kept their original text", engine.stats().exhausted);
    }
    if let Some(report_path) = matches.get_one::<String>("report") {
        report.save(report_path)?;
        info!("📋 Report generated: {}", report_path);
    }
    Ok(())
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| ConfigError::Invalid(format!("missing --{}", id)).into())
}

fn build_config(matches: &ArgMatches) -> Result<AnonymizerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => AnonymizerConfig::load(path)?,
        None => AnonymizerConfig::default(),
    };

    if let Some(overrides) = matches.get_many::<String>("set") {
        for assignment in overrides {
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| ConfigError::Invalid(format!("expected KEY=VALUE, got {}", assignment)))?;
            config.set(key.trim(), value.trim())?;
        }
    }
    if let Some(scope) = matches.get_one::<RedactionScope>("scope") {
        config.scope = *scope;
    }
    if let Some(chunking) = matches.get_one::<ChunkingMode>("chunking") {
        config.chunking = *chunking;
    }
    if let Some(source) = matches.get_one::<PoolSource>("pool-source") {
        config.pool_source = *source;
    }
    if let Some(exhaustion) = matches.get_one::<ExhaustionPolicy>("exhaustion") {
        config.exhaustion = *exhaustion;
    }
    if matches.get_flag("mask-images") {
        config.mask_images = true;
    }
    if matches.get_flag("highlight") {
        config.highlight = true;
    }

    config.validate()?;
    Ok(config)
}

fn build_policy(matches: &ArgMatches, config: &AnonymizerConfig, width: f64, height: f64) -> PolicyFilter {
    let zones = matches
        .get_one::<String>("zones")
        .map(|path| ZoneWhitelist::load_or_default(path, width, height))
        .unwrap_or_default();
    let stop_words = matches
        .get_one::<String>("stopwords")
        .map(StopWords::load_or_default)
        .unwrap_or_default();
    let words = matches
        .get_one::<String>("words")
        .map(|path| WordList::load_or_default(path, &stop_words))
        .unwrap_or_default();

    let scope = if matches.contains_id("words") && matches.get_one::<RedactionScope>("scope").is_none() {
        RedactionScope::Words
    } else {
        config.scope
    };
    if scope == RedactionScope::Words && words.is_empty() {
        warn!("⚠️  Word scope with an empty word list: anonymizing all text instead");
    }

    PolicyFilter::new(zones, CharWhitelist::new(&config.char_whitelist), words, scope)
}

fn display_config_summary(config: &AnonymizerConfig, policy: &PolicyFilter, input: &str, output: &str, seed: Option<u64>) {
    info!("📋 Configuration Summary:");
    info!("   Input:  {}", input);
    info!("   Output: {}", output);
    info!("   Resolution: {} dpi", config.resolution);
    info!("   Scope: {:?}, Chunking: {:?}, Pools: {:?}", policy.scope(), config.chunking, config.pool_source);
    info!("   Zones: {}, Words: {}", policy.zones().len(), policy.words().len());
    match seed {
        Some(seed) => info!("   Seed: {}", seed),
        None => info!("   Seed: random"),
    }
    if config.mask_images {
        info!("   Images: masked");
    }
}
