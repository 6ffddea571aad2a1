use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paybridge::application::correlator::MessageCorrelator;
use paybridge::application::orchestrator::SessionOrchestrator;
use paybridge::config::BridgeConfig;
use paybridge::domain::ports::{CheckoutObserverArc, CheckoutServiceArc};
use paybridge::domain::session::Session;
use paybridge::infrastructure::in_memory::{CheckoutFixture, InMemoryCheckoutService};
use paybridge::infrastructure::observer::TracingObserver;
use paybridge::interfaces::json::host_message;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host messages, one JSON object per line
    input: PathBuf,

    /// Checkout fixture seeding the simulated checkout service
    #[arg(long)]
    checkout: PathBuf,

    /// Bridge configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BridgeConfig::from_path(path).into_diagnostic()?,
        None => BridgeConfig::default(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let fixture = CheckoutFixture::from_path(&cli.checkout).into_diagnostic()?;
    let session = Session::new(fixture.checkout.clone());
    let service: CheckoutServiceArc = Arc::new(InMemoryCheckoutService::new(fixture));
    let observer: CheckoutObserverArc = Arc::new(TracingObserver);
    let orchestrator = Arc::new(SessionOrchestrator::new(session, service, observer, config));

    let (correlator, mut responses) = MessageCorrelator::new(orchestrator);

    // Responses go to stdout in delivery order.
    let writer = tokio::spawn(async move {
        while let Some(message) = responses.recv().await {
            println!("{}", host_message::encode(&message)?);
        }
        Ok::<_, paybridge::error::BridgeError>(())
    });

    let file = tokio::fs::File::open(&cli.input).await.into_diagnostic()?;
    let mut lines = BufReader::new(file).lines();
    while let Some(line) = lines.next_line().await.into_diagnostic()? {
        if line.trim().is_empty() {
            continue;
        }
        correlator.receive(&line).await;
    }

    let snapshot = correlator.orchestrator().current_snapshot();
    tracing::info!(
        checkout = %snapshot.id,
        total = %snapshot.total_price,
        completed = snapshot.completed,
        "host message stream finished"
    );

    drop(correlator);
    writer.await.into_diagnostic()?.into_diagnostic()?;

    Ok(())
}
