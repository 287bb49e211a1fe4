mod cli;

use clap::Parser;
use cli::{Cli, CliResult, exit_with_error};
use sparql_pager::input::resolve_query;
use sparql_pager::{
    Endpoint, HttpEndpoint, MeasurementLog, PageFetcher, PagerConfig, PaginationDriver,
    PaginationSession, PagingPlan, ParsedQuery, QueryRewriter, ResultSink, StoreEndpoint, UsageError,
};
use std::io::{self, BufWriter};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(cli: &Cli) {
    // Logs stay off unless --verbose; RUST_LOG then refines the filter.
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let text = resolve_query(cli.query.as_deref(), cli.file.as_deref())?;
    let config = cli.config();

    let rewriter = QueryRewriter::new(config.page_size)?;
    let plan = rewriter.rewrite(ParsedQuery::parse(&text)?);

    let (started, session) = match (&cli.local, &cli.server) {
        (Some(path), _) => {
            let endpoint = StoreEndpoint::from_turtle_file(path)?;
            info!(path = %path.display(), "paginating over local store");
            paginate(endpoint, &config, plan)?
        }
        (None, Some(server)) => {
            let endpoint = HttpEndpoint::new(server, &config)?;
            info!(url = endpoint.url(), "paginating over endpoint");
            paginate(endpoint, &config, plan)?
        }
        (None, None) => return Err(UsageError::NoEndpoint.into()),
    };

    let measurement = (!cli.silent)
        .then(|| MeasurementLog::new(&cli.measure).with_latency(cli.latency));
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    ResultSink::new(measurement)
        .measured_from(started)
        .emit(session, &mut out, &mut io::stderr())?;
    Ok(())
}

fn paginate<E: Endpoint>(
    endpoint: E,
    config: &PagerConfig,
    plan: PagingPlan,
) -> CliResult<(Instant, PaginationSession)> {
    let fetcher = PageFetcher::new(endpoint).with_error_marker(config.error_marker_regex()?);
    let driver = PaginationDriver::new(fetcher).with_timeout(config.session_timeout);
    // Measured from the first request until the output is written.
    let started = Instant::now();
    Ok((started, driver.run(plan)))
}
