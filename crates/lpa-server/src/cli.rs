//! Command line
//!
//! ```text
//! lpa serve [--bind ADDR]
//! lpa score --bank V --answers FILE [--json]
//! lpa render --bank V --answers FILE --child NAME --out FILE
//! lpa questions --bank V [--child NAME]
//! ```
//!
//! `--config FILE` and `--log-json` apply to every command.

use crate::routes::routes;
use crate::telemetry::{self, LogFormat};
use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lpa_core::{AssessmentService, ServiceConfig, SinkKind};
use lpa_report::ReportInput;
use lpa_scoring::Answer;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The `lpa` command
#[must_use]
pub fn command() -> Command {
    let bank = || {
        Arg::new("bank")
            .long("bank")
            .help("Question bank version (defaults to the configured bank)")
    };
    let answers = || {
        Arg::new("answers")
            .long("answers")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("JSON file with [{\"questionId\": 1, \"answer\": \"A\"}, ...]")
    };
    let child = || Arg::new("child").long("child").help("Child's name");

    Command::new("lpa")
        .version(crate::VERSION)
        .about("Learning Profile Assessment service")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("serve").about("Run the HTTP API").arg(
                Arg::new("bind")
                    .long("bind")
                    .value_parser(value_parser!(SocketAddr))
                    .help("Listen address (overrides config and LPA_BIND)"),
            ),
        )
        .subcommand(
            Command::new("score")
                .about("Score an answer file and print the report")
                .arg(bank())
                .arg(answers())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print profile and scores as JSON"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render the PDF report for an answer file")
                .arg(bank())
                .arg(answers())
                .arg(child().required(true))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output PDF path"),
                ),
        )
        .subcommand(
            Command::new("questions")
                .about("Print a bank's questions")
                .arg(bank())
                .arg(child()),
        )
}

/// Parse arguments and run the selected command
///
/// # Errors
/// Returns configuration, I/O or service errors
pub async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let format = if matches.get_flag("log-json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    telemetry::init(format);

    let mut config = ServiceConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("serve", args)) => {
            if let Some(bind) = args.get_one::<SocketAddr>("bind") {
                config.bind = *bind;
            }
            let bind = config.bind;
            let service = Arc::new(AssessmentService::from_config(config)?);
            serve(service, bind).await
        }
        Some(("score", args)) => {
            config.sink.kind = SinkKind::Memory;
            let service = AssessmentService::from_config(config)?;
            score(&service, args)
        }
        Some(("render", args)) => {
            config.sink.kind = SinkKind::Memory;
            let service = AssessmentService::from_config(config)?;
            render(&service, args).await
        }
        Some(("questions", args)) => {
            config.sink.kind = SinkKind::Memory;
            let service = AssessmentService::from_config(config)?;
            questions(&service, args)
        }
        Some((other, _)) => bail!("unknown command `{other}`"),
        None => bail!("no command given"),
    }
}

/// Serve the API until Ctrl+C or SIGTERM
///
/// # Errors
/// Returns an error if the address cannot be bound
pub async fn serve(service: Arc<AssessmentService>, bind: SocketAddr) -> anyhow::Result<()> {
    tracing::info!(?service, "starting server");
    let (addr, server) = warp::serve(routes(service))
        .try_bind_with_graceful_shutdown(bind, shutdown_signal())
        .with_context(|| format!("cannot bind {bind}"))?;
    tracing::info!("listening on {}", addr);
    server.await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Read an answer file
///
/// # Errors
/// Returns an error if the file is unreadable or not a JSON answer list
pub fn read_answers(path: &Path) -> anyhow::Result<Vec<Answer>> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("invalid answers in {}", path.display()))
}

fn score(service: &AssessmentService, args: &ArgMatches) -> anyhow::Result<()> {
    let answers = read_answers(answer_path(args)?)?;
    let (bank, evaluation) = service.evaluate(args.get_one::<String>("bank").map(String::as_str), &answers)?;

    if args.get_flag("json") {
        let out = serde_json::json!({
            "bank": bank.version,
            "profile": evaluation.profile,
            "scores": evaluation.sheet.to_map(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let report = service.report(&bank, &evaluation.profile, lpa_report::FALLBACK_CHILD)?;
    println!("Bank: {} ({})", bank.version, bank.fingerprint().short());
    println!("Primary: {}", evaluation.profile.primary);
    if let Some(secondary) = &evaluation.profile.secondary {
        println!("Secondary: {secondary}");
    }
    for domain in &evaluation.profile.domains {
        println!(
            "  {}: {} ({:.2} pts, {}th percentile)",
            domain.label,
            domain.primary,
            domain.raw.as_f64(),
            domain.percentile
        );
    }
    for skipped in evaluation.sheet.skipped() {
        println!(
            "  skipped question {} option {}: {:?}",
            skipped.answer.question, skipped.answer.option, skipped.reason
        );
    }
    println!();
    print!("{}", report.to_text());
    Ok(())
}

async fn render(service: &AssessmentService, args: &ArgMatches) -> anyhow::Result<()> {
    let answers = read_answers(answer_path(args)?)?;
    let child = args.get_one::<String>("child").map_or("", String::as_str);
    let out = args
        .get_one::<PathBuf>("out")
        .context("--out is required")?;

    let (_, evaluation) = service.evaluate(args.get_one::<String>("bank").map(String::as_str), &answers)?;
    let input = ReportInput::from_profile(&evaluation.profile, child, chrono::Utc::now().date_naive());
    let pdf = service.render_pdf(&input).await?;
    tokio::fs::write(out, pdf.as_slice())
        .await
        .with_context(|| format!("cannot write {}", out.display()))?;
    println!(
        "Wrote {} ({} bytes, {} style)",
        out.display(),
        pdf.len(),
        input.primary_style
    );
    Ok(())
}

fn questions(service: &AssessmentService, args: &ArgMatches) -> anyhow::Result<()> {
    let bank = service.bank(args.get_one::<String>("bank").map(String::as_str))?;
    let child = args.get_one::<String>("child").map_or("", String::as_str);

    println!("{} ({})", bank.title, bank.version);
    for question in bank.personalized_questions(child) {
        println!();
        println!("{}. [{}] {}", question.id, question.section, question.prompt);
        for option in &question.options {
            println!("   {}) {}", option.id, option.text);
        }
    }
    Ok(())
}

fn answer_path(args: &ArgMatches) -> anyhow::Result<&Path> {
    args.get_one::<PathBuf>("answers")
        .map(PathBuf::as_path)
        .context("--answers is required")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn parses_render() {
        let matches = command()
            .try_get_matches_from([
                "lpa", "render", "--bank", "classic", "--answers", "a.json", "--child", "Maya",
                "--out", "m.pdf", "--log-json",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "render");
        assert_eq!(args.get_one::<String>("bank").unwrap(), "classic");
        assert!(matches.get_flag("log-json"));
    }

    #[test]
    fn render_requires_out() {
        assert!(command()
            .try_get_matches_from(["lpa", "render", "--answers", "a.json", "--child", "Maya"])
            .is_err());
    }

    #[test]
    fn serve_bind_parses_address() {
        let matches = command()
            .try_get_matches_from(["lpa", "serve", "--bind", "0.0.0.0:3000"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<SocketAddr>("bind").unwrap().port(), 3000);
        assert!(command().try_get_matches_from(["lpa", "serve", "--bind", "nope"]).is_err());
    }
}
