use anyhow::Context;
use clap::Parser;
use transcript_cleaner::core::chunker::Chunker;
use transcript_cleaner::core::pipeline::decode_transcript;
use transcript_cleaner::utils::error::ErrorSeverity;
use transcript_cleaner::utils::text::{extract_speakers_from_text, truncate_chars};
use transcript_cleaner::utils::{logger, validation::Validate};
use transcript_cleaner::{
    CleanerConfig, CleanerEngine, CleanerError, CleaningPipeline, CliConfig, LocalStorage,
    OpenAiClient, RunPaths, TranscriptCleaner,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so OPENAI_API_KEY can come from it.
    let _ = dotenvy::dotenv();
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting transcript-cleaner");
    tracing::debug!("CLI config: {:?}", CliConfig { api_key: None, ..cli.clone() });

    if let Err(e) = cli.validate() {
        fail(&e);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Err(e) = config.validate() {
        fail(&e);
    }

    if !std::path::Path::new(&cli.input).exists() {
        tracing::error!("Input file {} not found", cli.input);
        eprintln!("❌ Input file {} not found", cli.input);
        std::process::exit(1);
    }

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No API calls will be made");
        return dry_run(&cli, &config);
    }

    let llm = match OpenAiClient::new(&config.llm, config.api_key()) {
        Ok(llm) => llm,
        Err(e) => fail(&e),
    };

    let cleaner = TranscriptCleaner::new(llm, &config);
    let pipeline = CleaningPipeline::new(
        LocalStorage::default(),
        cleaner,
        RunPaths {
            input: cli.input.clone(),
            output: cli.output.clone(),
            report: cli.report.clone(),
        },
    );

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    let engine = CleanerEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Transcript cleaning completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &CleanerError) -> ! {
    tracing::error!(
        "❌ Error processing transcript: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn dry_run(cli: &CliConfig, config: &CleanerConfig) -> anyhow::Result<()> {
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input))?;
    let text = decode_transcript(bytes)?;

    let processing = &config.processing;
    let chunks = Chunker::new(processing.chunk_size, processing.chunk_overlap).chunk(&text);
    let calls_per_chunk = if processing.identify_speakers { 2 } else { 1 };
    let qa_calls = usize::from(config.quality.enabled && !chunks.is_empty());

    println!("📋 Transcript: {} ({} chars)", cli.input, text.chars().count());
    println!("🤖 Model: {} (review: {})", config.llm.model, config.qa_model());
    println!(
        "✂️  {} chunks of up to {} chars, {} overlap, {} workers",
        chunks.len(),
        processing.chunk_size,
        processing.chunk_overlap,
        processing.max_workers
    );
    for chunk in &chunks {
        let first_line = chunk.text.lines().next().unwrap_or("");
        println!(
            "  [{:>3}] {:>5} chars | {}",
            chunk.index,
            chunk.text.chars().count(),
            truncate_chars(first_line, 60)
        );
    }

    let speakers = extract_speakers_from_text(&text);
    if !speakers.is_empty() {
        println!("🗣  Speakers found: {}", speakers.join(", "));
    }
    println!(
        "📡 Would make {} API calls and write {}",
        chunks.len() * calls_per_chunk + qa_calls,
        cli.output
    );
    Ok(())
}
