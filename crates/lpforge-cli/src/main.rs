mod render;
mod server;

use std::env;
use std::fs;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lpforge_contracts::brief::AnalysisTarget;
use lpforge_contracts::credential::CredentialHolder;
use lpforge_contracts::events::EventWriter;
use lpforge_contracts::image::InlineImage;
use lpforge_contracts::outline::{OutlineForm, DEFAULT_GOAL, DEFAULT_MOOD, GOAL_CHOICES};
use lpforge_engine::{
    new_run_id, BriefAnalyzer, CandidateFailure, ContentExtractor, DirectorError, GeminiTransport,
    ListedModel, OutlineGenerator, DEFAULT_LANGUAGE,
};
use tracing_subscriber::EnvFilter;

use crate::server::{AppState, LiveDirector};

const DEFAULT_LOG_FILTER: &str = "lpforge=info,lpforge_engine=info";
const FALLBACK_KEY_ENV: &str = "GOOGLE_API_KEY";

// No Debug derives on argument structs: they carry the API key.
#[derive(Parser)]
#[command(
    name = "lpforge",
    version,
    about = "Landing-page outlines and creative briefs from Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a landing-page outline for a product.
    Outline(OutlineArgs),
    /// Produce a creative brief for an existing page or screenshot.
    Analyze(AnalyzeArgs),
    /// List the models an API key can reach.
    Models(ModelsArgs),
    /// Serve the outline and analysis forms over HTTP.
    Serve(ServeArgs),
}

#[derive(Args)]
struct SessionArgs {
    /// Gemini API key. Falls back to GOOGLE_API_KEY.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Language for generated copy.
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,
    /// Append sequence events to this JSONL file.
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Args)]
struct OutlineArgs {
    #[command(flatten)]
    session: SessionArgs,
    #[arg(long)]
    product_name: String,
    #[arg(long)]
    target_audience: String,
    #[arg(long)]
    usp: String,
    #[arg(long, default_value = DEFAULT_GOAL, help = goal_help())]
    goal: String,
    #[arg(long, default_value = DEFAULT_MOOD)]
    mood: String,
    #[arg(long, default_value = "")]
    notes: String,
    /// Model to try before the built-in list.
    #[arg(long)]
    model: Option<String>,
    /// Reference image for the design mood.
    #[arg(long)]
    ref_image: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    session: SessionArgs,
    #[arg(long, conflicts_with = "image", required_unless_present = "image")]
    url: Option<String>,
    /// Screenshot of the page.
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ModelsArgs {
    /// Prompted for on stdin when absent.
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    session: SessionArgs,
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("lpforge error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn goal_help() -> String {
    format!("Conversion goal: {} or free text", GOAL_CHOICES.join(", "))
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Outline(args) => run_outline(args),
        Command::Analyze(args) => run_analyze(args),
        Command::Models(args) => run_models(args),
        Command::Serve(args) => run_serve(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run_outline(args: OutlineArgs) -> Result<i32> {
    let credentials = session_credentials(&args.session);
    let events = open_events(args.session.events.as_deref())?;
    let ref_image = args.ref_image.as_deref().map(load_image).transpose()?;
    let request = OutlineForm {
        product_name: args.product_name,
        target_audience: args.target_audience,
        usp: args.usp,
        goal: args.goal,
        mood: args.mood,
        other_notes: args.notes,
        model_id: args.model,
    }
    .into_request(ref_image);

    let generator = OutlineGenerator::new(Arc::new(GeminiTransport::new()))
        .with_language(args.session.language)
        .with_events(events);
    eprintln!(
        "Generating outline ({} candidate models)...",
        generator.candidates(&request).len()
    );
    let outcome = generator.generate(&credentials, &request)?;
    report_recovered(&outcome.recovered);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.value)?);
    } else {
        print!("{}", render::outline_text(&outcome.value, &outcome.model));
    }
    Ok(0)
}

fn run_analyze(args: AnalyzeArgs) -> Result<i32> {
    let credentials = session_credentials(&args.session);
    let events = open_events(args.session.events.as_deref())?;
    let target = match (args.url, args.image) {
        (Some(url), _) => AnalysisTarget::Url(url),
        (None, Some(path)) => AnalysisTarget::Image(load_image(&path)?),
        (None, None) => bail!("URL or Image is required"),
    };

    let analyzer = BriefAnalyzer::new(
        Arc::new(GeminiTransport::new()),
        Arc::new(ContentExtractor::new()),
    )
    .with_language(args.session.language)
    .with_events(events);
    eprintln!("Analyzing {}...", target.label());
    let outcome = analyzer.analyze(&credentials, &target)?;
    report_recovered(&outcome.recovered);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.value)?);
    } else {
        print!("{}", render::brief_text(&outcome.value, &outcome.model));
    }
    Ok(0)
}

fn run_models(args: ModelsArgs) -> Result<i32> {
    let raw = match args.api_key {
        Some(key) => key,
        None => prompt_for_key()?,
    };
    let credentials = CredentialHolder::with_key(raw);
    let Some(credential) = credentials.get() else {
        bail!(DirectorError::CredentialMissing);
    };

    let transport = GeminiTransport::new();
    println!("Checking available models at {}...", transport.api_base());
    match transport.list_models(credential) {
        Ok(models) => {
            print!("{}", model_listing_text(&models));
            Ok(0)
        }
        Err(err) => {
            eprintln!("Model listing failed: {err:#}");
            eprintln!();
            eprintln!("Troubleshooting:");
            eprintln!("  1. Check that the API key is correct and has not been revoked.");
            eprintln!("  2. Check that the Generative Language API is enabled for the key's project.");
            eprintln!("  3. Check that your network or region can reach {}.", transport.api_base());
            Ok(1)
        }
    }
}

fn run_serve(args: ServeArgs) -> Result<i32> {
    let credentials = session_credentials(&args.session);
    let events = open_events(args.session.events.as_deref())?;
    let director = LiveDirector::new(args.session.language, events);
    let state = AppState::new(Arc::new(director), credentials);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(server::serve(args.bind, state))?;
    Ok(0)
}

/// `--api-key`/`GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
fn session_credentials(args: &SessionArgs) -> CredentialHolder {
    let holder = CredentialHolder::with_key(args.api_key.clone().unwrap_or_default());
    if holder.has_key() {
        return holder;
    }
    CredentialHolder::with_key(env::var(FALLBACK_KEY_ENV).unwrap_or_default())
}

fn prompt_for_key() -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "Gemini API key: ")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read the API key from stdin")?;
    Ok(line.trim().to_string())
}

fn open_events(path: Option<&Path>) -> Result<Option<EventWriter>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let events = EventWriter::new(path, new_run_id());
    tracing::info!(path = %path.display(), run_id = events.run_id(), "writing sequence events");
    Ok(Some(events))
}

fn load_image(path: &Path) -> Result<InlineImage> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let image = InlineImage::new(bytes, None).map_err(DirectorError::from)?;
    Ok(image)
}

fn report_recovered(recovered: &[CandidateFailure]) {
    for failure in recovered {
        eprintln!("  skipped {failure}");
    }
}

fn model_listing_text(models: &[ListedModel]) -> String {
    if models.is_empty() {
        return "No models are available to this key.\n".to_string();
    }
    let mut out = String::new();
    for model in models {
        out.push_str(&format!("- {}\n", model.name));
        if let Some(display) = model.display_name.as_deref() {
            out.push_str(&format!("  display name: {display}\n"));
        }
        let methods = if model.supported_generation_methods.is_empty() {
            "(none)".to_string()
        } else {
            model.supported_generation_methods.join(", ")
        };
        out.push_str(&format!("  methods: {methods}\n"));
    }
    let example = models
        .iter()
        .find(|model| {
            model
                .supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
        })
        .map(ListedModel::short_name)
        .unwrap_or("gemini-1.5-flash");
    out.push_str(&format!(
        "\nUse the model names without the \"models/\" prefix (for example {example}).\n"
    ));
    out
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use lpforge_engine::ListedModel;

    use super::{
        model_listing_text, session_credentials, Cli, Command, SessionArgs, DEFAULT_LOG_FILTER,
    };

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn outline_defaults_goal_mood_and_language() {
        let cli = Cli::try_parse_from([
            "lpforge",
            "outline",
            "--product-name",
            "Acme Analytics",
            "--target-audience",
            "SMB owners",
            "--usp",
            "one-click reports",
        ])
        .unwrap();
        let Command::Outline(args) = cli.command else {
            panic!("expected outline");
        };
        assert_eq!(args.goal, "purchase");
        assert_eq!(args.mood, "professional");
        assert_eq!(args.session.language, "Japanese");
        assert!(args.model.is_none() && args.ref_image.is_none());
    }

    #[test]
    fn analyze_takes_exactly_one_target() {
        assert!(Cli::try_parse_from(["lpforge", "analyze"]).is_err());
        assert!(Cli::try_parse_from([
            "lpforge",
            "analyze",
            "--url",
            "https://acme.test",
            "--image",
            "shot.png"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["lpforge", "analyze", "--image", "shot.png"]).is_ok());
    }

    #[test]
    fn serve_binds_localhost_by_default() {
        let cli = Cli::try_parse_from(["lpforge", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn explicit_key_wins() {
        let args = SessionArgs {
            api_key: Some("  flag-key ".to_string()),
            language: "English".to_string(),
            events: None,
        };
        let holder = session_credentials(&args);
        assert_eq!(holder.get().map(|key| key.expose()), Some("flag-key"));
    }

    #[test]
    fn listing_prints_methods_and_prefix_hint() {
        let models = vec![
            ListedModel {
                name: "models/embedding-001".to_string(),
                display_name: None,
                supported_generation_methods: vec!["embedContent".to_string()],
            },
            ListedModel {
                name: "models/gemini-1.5-flash-002".to_string(),
                display_name: Some("Gemini 1.5 Flash 002".to_string()),
                supported_generation_methods: vec![
                    "generateContent".to_string(),
                    "countTokens".to_string(),
                ],
            },
        ];
        let text = model_listing_text(&models);
        assert!(text.contains("- models/gemini-1.5-flash-002\n  display name: Gemini 1.5 Flash 002\n"));
        assert!(text.contains("  methods: generateContent, countTokens\n"));
        assert!(text.contains("without the \"models/\" prefix (for example gemini-1.5-flash-002)"));
        assert_eq!(model_listing_text(&[]), "No models are available to this key.\n");
    }

    #[test]
    fn default_log_filter_covers_this_binary() {
        let own_target = module_path!().split("::").next().unwrap_or_default();
        assert!(
            DEFAULT_LOG_FILTER
                .split(',')
                .any(|directive| directive == format!("{own_target}=info")),
            "{own_target} is not enabled by {DEFAULT_LOG_FILTER}"
        );
    }

    #[test]
    fn goal_help_lists_the_preset_goals() {
        let command = Cli::command();
        let outline = command.find_subcommand("outline").unwrap();
        let goal = outline
            .get_arguments()
            .find(|arg| arg.get_id() == "goal")
            .unwrap();
        let help = goal.get_help().map(ToString::to_string).unwrap_or_default();
        for choice in ["purchase", "lead", "app_install", "webinar", "branding"] {
            assert!(help.contains(choice), "missing {choice} in {help}");
        }
    }
}
