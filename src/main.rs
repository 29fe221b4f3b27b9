use bigfive::catalog::{CatalogProvider, DirectoryCatalog};
use bigfive::config::Config;
use bigfive::request::{ErrorResponse, ScoreResponse, ValidationResponse};
use bigfive::scoring::ScoringError;
use bigfive::store::{AssessmentRecord, AssessmentStore, JsonFileStore};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info};

// Exit codes: 1 mirrors a 4xx response, 3 a 5xx
const EXIT_SUCCESS: i32 = 0;
const EXIT_CLIENT: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;
const EXIT_INTERNAL: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score an answers file and store the result
    Score {
        /// JSON file: {assessmentId?, userId?, language?, answers: [...]} or a bare answer list
        file: PathBuf,
        /// Catalog language (overrides the request and config)
        #[arg(short, long)]
        language: Option<String>,
        /// Assessment id (overrides the request)
        #[arg(long)]
        assessment_id: Option<String>,
        /// User the assessment belongs to
        #[arg(short, long)]
        user: Option<String>,
        /// Print the result without saving it
        #[arg(long)]
        no_save: bool,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Check an answers file for malformed answers without scoring
    Validate {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// List catalog questions and a fresh assessment id
    Questions {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long, default_value = "anonymous")]
        user: String,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Summarize a catalog, or check all languages share the same ids
    Catalog {
        #[arg(short, long)]
        language: Option<String>,
        /// Compare the id sets of every language
        #[arg(long)]
        check: bool,
    },
    /// Show a stored assessment
    Show {
        assessment_id: String,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Report whether an assessment is stored and who it belongs to
    Status {
        assessment_id: String,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// List a user's stored assessments, newest first
    History {
        user_id: String,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Compare domain and facet scores of stored assessments side by side
    Compare {
        #[arg(required = true, num_args = 1..)]
        assessment_ids: Vec<String>,
    },
    /// Delete a stored assessment
    Delete { assessment_id: String },
}

#[derive(Parser, Debug)]
#[command(name = "bigfive")]
#[command(about = "Big Five personality assessment scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/bigfive/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "bigfive=debug" } else { "bigfive=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            EXIT_INTERNAL
        }
    }
}

/// Report a failure in the requested format and return its exit code
fn fail(code: i32, message: &str, format: Format) -> i32 {
    match format {
        Format::Json => {
            print_json(&ErrorResponse::new(message));
        }
        Format::Table => eprintln!("Error: {}", message),
    }
    code
}

/// Log the detail of an unexpected failure; the caller only sees a generic message
fn fail_internal(err: &anyhow::Error, format: Format) -> i32 {
    error!("{:#}", err);
    fail(EXIT_INTERNAL, "Internal error (run with --verbose for details)", format)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);
    let config = match bigfive::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = bigfive::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let (catalogs, store) = match (
        bigfive::config::catalog_dir(&config),
        bigfive::config::store_path(&config),
    ) {
        (Ok(dir), Ok(path)) => (DirectoryCatalog::new(dir), JsonFileStore::new(path)),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    debug!(
        "Catalogs in {}, store at {}",
        catalogs.dir().display(),
        store.path().display()
    );

    let code = match cli.command {
        Commands::Score {
            file,
            language,
            assessment_id,
            user,
            no_save,
            format,
        } => run_score(
            &config,
            &catalogs,
            store,
            ScoreArgs {
                file,
                language,
                assessment_id,
                user,
                no_save,
            },
            format,
        ),
        Commands::Validate { file, format } => run_validate(&file, format),
        Commands::Questions {
            language,
            user,
            format,
        } => run_questions(&config, &catalogs, language, &user, format),
        Commands::Catalog { language, check } => run_catalog(&config, &catalogs, language, check),
        Commands::Show {
            assessment_id,
            format,
        } => run_show(&store, &assessment_id, format),
        Commands::Status {
            assessment_id,
            format,
        } => run_status(&store, &assessment_id, format),
        Commands::History { user_id, format } => run_history(&store, &user_id, format),
        Commands::Compare { assessment_ids } => run_compare(&store, &assessment_ids),
        Commands::Delete { assessment_id } => run_delete(store, &assessment_id),
    };

    std::process::exit(code);
}

struct ScoreArgs {
    file: PathBuf,
    language: Option<String>,
    assessment_id: Option<String>,
    user: Option<String>,
    no_save: bool,
}

fn run_score(
    config: &Config,
    catalogs: &DirectoryCatalog,
    mut store: JsonFileStore,
    args: ScoreArgs,
    format: Format,
) -> i32 {
    let request = match bigfive::request::load_request(&args.file) {
        Ok(r) => r,
        Err(e) => return fail(EXIT_CLIENT, &format!("{:#}", e), format),
    };

    if let Err(errors) = bigfive::request::validate_request(&request) {
        return fail(EXIT_CLIENT, &errors.join("; "), format);
    }

    let language = args
        .language
        .or(request.language.clone())
        .unwrap_or_else(|| config.language().to_string());

    let catalog = match catalogs.catalog(&language) {
        Ok(c) => c,
        Err(e) => return fail_internal(&e, format),
    };

    let results = match bigfive::scoring::score(&catalog, &request.answers) {
        Ok(r) => r,
        Err(e @ ScoringError::EmptyCatalog) => {
            return fail_internal(&anyhow::Error::new(e), format)
        }
        Err(e) => return fail(EXIT_CLIENT, &e.to_string(), format),
    };

    let user_id = args.user.or(request.user_id.clone());
    let assessment_id = args
        .assessment_id
        .or(request.assessment_id.clone())
        .unwrap_or_else(|| {
            bigfive::store::new_assessment_id(
                user_id.as_deref().unwrap_or("anonymous"),
                Utc::now(),
            )
        });

    info!(
        "Scored {} answers for {} ({})",
        request.answers.len(),
        assessment_id,
        catalog.language()
    );

    if !args.no_save {
        let record = AssessmentRecord {
            assessment_id: assessment_id.clone(),
            user_id,
            language: catalog.language().to_string(),
            answers: request.answers.clone(),
            results: results.clone(),
            completed_at: results.generated_at,
        };
        if let Err(e) = store.save(record) {
            return fail_internal(&e, format);
        }
    }

    match format {
        Format::Json => print_json(&ScoreResponse::completed(
            assessment_id,
            catalog.language().to_string(),
            results,
            request.answers.len(),
        )),
        Format::Table => {
            let use_colors = bigfive::output::should_use_colors();
            println!("Assessment {} ({})", assessment_id, catalog.language());
            println!("{}", bigfive::output::format_result(&results, use_colors));
            EXIT_SUCCESS
        }
    }
}

fn run_validate(file: &std::path::Path, format: Format) -> i32 {
    let request = match bigfive::request::load_request(file) {
        Ok(r) => r,
        Err(e) => return fail(EXIT_CLIENT, &format!("{:#}", e), format),
    };

    let errors = bigfive::request::validate_request(&request)
        .err()
        .unwrap_or_default();
    let valid = errors.is_empty();

    match format {
        Format::Json => {
            print_json(&ValidationResponse {
                success: valid,
                assessment_id: request.assessment_id.clone(),
                answers_count: request.answers.len(),
                status: if valid { "validated" } else { "invalid" }.to_string(),
                errors,
            });
        }
        Format::Table => {
            if valid {
                println!("{} answers validated", request.answers.len());
            } else {
                eprintln!("Invalid answers:");
                for error in &errors {
                    eprintln!("  - {}", error);
                }
            }
        }
    }

    if valid {
        EXIT_SUCCESS
    } else {
        EXIT_CLIENT
    }
}

fn run_questions(
    config: &Config,
    catalogs: &DirectoryCatalog,
    language: Option<String>,
    user: &str,
    format: Format,
) -> i32 {
    let language = language.unwrap_or_else(|| config.language().to_string());
    let catalog = match catalogs.catalog(&language) {
        Ok(c) => c,
        Err(e) => return fail_internal(&e, format),
    };
    let assessment_id = bigfive::store::new_assessment_id(user, Utc::now());

    match format {
        Format::Json => print_json(&serde_json::json!({
            "assessmentId": assessment_id,
            "userId": user,
            "language": catalog.language(),
            "questionsCount": catalog.len(),
            "questions": catalog.questions(),
        })),
        Format::Table => {
            let use_colors = bigfive::output::should_use_colors();
            println!("Assessment {} ({})", assessment_id, catalog.language());
            println!("{}", bigfive::output::format_questions(&catalog, use_colors));
            EXIT_SUCCESS
        }
    }
}

fn run_catalog(
    config: &Config,
    catalogs: &DirectoryCatalog,
    language: Option<String>,
    check: bool,
) -> i32 {
    if check {
        return match catalogs.check_consistency() {
            Ok(report) => {
                println!("{}", bigfive::output::format_consistency(&report));
                if report.is_consistent() {
                    EXIT_SUCCESS
                } else {
                    EXIT_CONFIG
                }
            }
            Err(e) => {
                eprintln!("Catalog error: {:#}", e);
                EXIT_CONFIG
            }
        };
    }

    let language = language.unwrap_or_else(|| config.language().to_string());
    match catalogs.catalog(&language) {
        Ok(catalog) => {
            println!(
                "{}",
                bigfive::output::format_catalog_summary(catalog.language(), &catalog.summary())
            );
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Catalog error: {:#}", e);
            EXIT_CONFIG
        }
    }
}

fn run_show(store: &JsonFileStore, assessment_id: &str, format: Format) -> i32 {
    let record = match store.load(assessment_id) {
        Ok(Some(r)) => r,
        Ok(None) => {
            return fail(
                EXIT_NOT_FOUND,
                &format!("Assessment {} not found", assessment_id),
                format,
            )
        }
        Err(e) => return fail_internal(&e, format),
    };

    match format {
        Format::Json => print_json(&record),
        Format::Table => {
            let use_colors = bigfive::output::should_use_colors();
            println!(
                "Assessment {} ({}, {} answers, completed {})",
                record.assessment_id,
                record.language,
                record.answers.len(),
                record.completed_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!(
                "{}",
                bigfive::output::format_result(&record.results, use_colors)
            );
            EXIT_SUCCESS
        }
    }
}

fn run_status(store: &JsonFileStore, assessment_id: &str, format: Format) -> i32 {
    let record = match store.load(assessment_id) {
        Ok(r) => r,
        Err(e) => return fail_internal(&e, format),
    };

    let user_id = record
        .as_ref()
        .and_then(|r| r.user_id.clone())
        .or_else(|| bigfive::store::user_from_assessment_id(assessment_id).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());
    let status = if record.is_some() { "completed" } else { "not_found" };

    match format {
        Format::Json => print_json(&serde_json::json!({
            "assessmentId": assessment_id,
            "userId": user_id,
            "status": status,
            "completedAt": record.as_ref().map(|r| r.completed_at),
        })),
        Format::Table => {
            println!("{}  user={}  status={}", assessment_id, user_id, status);
            EXIT_SUCCESS
        }
    }
}

fn run_history(store: &JsonFileStore, user_id: &str, format: Format) -> i32 {
    let records = match store.history(user_id) {
        Ok(r) => r,
        Err(e) => return fail_internal(&e, format),
    };

    match format {
        Format::Json => print_json(&serde_json::json!({
            "userId": user_id,
            "history": records,
        })),
        Format::Table => {
            let use_colors = bigfive::output::should_use_colors();
            println!("{}", bigfive::output::format_history(&records, use_colors));
            EXIT_SUCCESS
        }
    }
}

fn run_compare(store: &JsonFileStore, assessment_ids: &[String]) -> i32 {
    let mut records = Vec::with_capacity(assessment_ids.len());
    for id in assessment_ids {
        match store.load(id) {
            Ok(Some(r)) => records.push(r),
            Ok(None) => {
                return fail(
                    EXIT_NOT_FOUND,
                    &format!("Assessment {} not found", id),
                    Format::Table,
                )
            }
            Err(e) => return fail_internal(&e, Format::Table),
        }
    }

    let use_colors = bigfive::output::should_use_colors();
    println!("{}", bigfive::output::format_compare(&records, use_colors));
    EXIT_SUCCESS
}

fn run_delete(mut store: JsonFileStore, assessment_id: &str) -> i32 {
    match store.delete(assessment_id) {
        Ok(true) => {
            println!("Deleted assessment {}", assessment_id);
            EXIT_SUCCESS
        }
        Ok(false) => fail(
            EXIT_NOT_FOUND,
            &format!("Assessment {} not found", assessment_id),
            Format::Table,
        ),
        Err(e) => fail_internal(&e, Format::Table),
    }
}
