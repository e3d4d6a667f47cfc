use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sotd_core::ingest::news::DEFAULT_MAX_ARTICLES;
use sotd_core::pipeline::Orchestrator;

#[derive(Debug, Parser)]
#[command(name = "sotd_worker", about = "Produce one stock-of-the-day recommendation")]
struct Args {
    /// Print the recommendation as JSON instead of the page text.
    #[arg(long)]
    json: bool,

    /// Number of news headlines fed into the analysis prompt.
    #[arg(long, default_value_t = DEFAULT_MAX_ARTICLES)]
    max_headlines: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sotd_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    settings.validate_required()?;
    let orchestrator = Orchestrator::from_settings(&settings)?.with_max_headlines(args.max_headlines);

    match orchestrator.produce_recommendation().await {
        Ok(rec) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                println!("{}", rec.render_text());
            }
            Ok(())
        }
        Err(err) => {
            let stage = err.stage;
            if let Some(diag) = err.llm_diagnostics() {
                tracing::error!(
                    %stage,
                    provider = %diag.provider,
                    detail = %diag.detail,
                    raw_output = diag.raw_output.as_deref().unwrap_or(""),
                    "LLM provider response"
                );
            }
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%stage, error = %err, "recommendation run failed");
            Err(err)
        }
    }
}

fn init_sentry(settings: &sotd_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from(["sotd_worker"]).unwrap();
        assert!(!args.json);
        assert_eq!(args.max_headlines, DEFAULT_MAX_ARTICLES);

        let args = Args::try_parse_from(["sotd_worker", "--json", "--max-headlines", "5"]).unwrap();
        assert!(args.json);
        assert_eq!(args.max_headlines, 5);
    }
}
