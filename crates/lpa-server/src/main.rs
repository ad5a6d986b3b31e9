use lpa_server::cli;

#[tokio::main]
async fn main() {
    let matches = cli::command().get_matches();
    if let Err(err) = cli::run(matches).await {
        tracing::error!("{:#}", err);
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
