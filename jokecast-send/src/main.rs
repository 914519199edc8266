//! jokecast-send - Post one fresh dad joke and exit
//!
//! Meant to be fired by a scheduler. Everything is configured through the
//! environment; the only flags are for humans running it by hand.

use anyhow::Context;
use clap::Parser;
use libjokecast::credentials::secret_source_for;
use libjokecast::jokes::HttpJokeSource;
use libjokecast::logging::LoggingConfig;
use libjokecast::platforms::twitter::TwitterClient;
use libjokecast::{handle_invocation, Config, Delivery, JokecastError};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "jokecast-send")]
#[command(version)]
#[command(about = "Post a dad joke that has not been posted recently")]
#[command(long_about = "\
jokecast-send - Post a dad joke that has not been posted recently

DESCRIPTION:
    Resolves the posting credentials, fetches a random joke, checks it
    against the account's recent timeline and posts it with the
    #pun #dadjoke hashtags. Empty, failed and duplicate fetches are
    retried up to JOKECAST_MAX_TRIES times.

    On success prints 'Sent!' to stdout. If the post itself is rejected
    prints 'Failed to send'. Details go to stderr.

ENVIRONMENT:
    ENVIRONMENT               'production' reads credentials from AWS SSM
    TWITTER_CONSUMER_KEY      Credential value, or SSM parameter name in production
    TWITTER_CONSUMER_SECRET   (same)
    TWITTER_ACCESS_KEY        (same)
    TWITTER_ACCESS_SECRET     (same)
    TWITTER_SCREEN_NAME       Account whose timeline is checked for duplicates
    TWITTER_API_BASE          Posting API base URL
    AWS_DEFAULT_REGION        SSM region
    JOKECAST_AWS_REGION       SSM region, overrides AWS_DEFAULT_REGION
    JOKECAST_JOKE_ENDPOINT    Joke service URL
    JOKECAST_FETCH_TIMEOUT    Joke fetch timeout (default: 2s)
    JOKECAST_REQUEST_TIMEOUT  Posting API and SSM timeout (default: 5s)
    JOKECAST_MAX_TRIES        Fetch attempts per run (default: 5)
    JOKECAST_HISTORY_WINDOW   Recent posts to compare against (default: 30)
    JOKECAST_CHECK_DUPLICATES 'false' skips the duplicate check (default: true)
    JOKECAST_CONFIG           Optional TOML config file
    JOKECAST_LOG_FORMAT       text, json or pretty (default: text)
    JOKECAST_LOG_LEVEL        Log filter (default: info)

EXIT CODES:
    0 - Joke posted
    1 - No joke could be posted
    2 - Credential error
    3 - Configuration error
")]
struct Cli {
    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    logging.init();

    match run().await {
        Ok(delivery) => println!("{}", delivery.status()),
        Err(e) => {
            let failure = e.downcast_ref::<JokecastError>();
            if let Some(status) = failure.and_then(|f| f.status_message()) {
                println!("{}", status);
            }
            eprintln!("Error: {:#}", e);
            std::process::exit(failure.map(|f| f.exit_code()).unwrap_or(1));
        }
    }
}

async fn run() -> anyhow::Result<Delivery> {
    let config = Config::load().context("Failed to load configuration")?;

    let secrets = secret_source_for(&config.credentials)
        .await
        .context("Failed to set up the secret source")?;
    let jokes = Arc::new(HttpJokeSource::from_config(&config.jokes)?);

    let delivery = handle_invocation(&config, secrets.as_ref(), jokes, |credentials| {
        TwitterClient::authenticate(credentials, &config.twitter)
    })
    .await?;

    info!("Posted {} ({})", delivery.post_id, delivery.text);
    Ok(delivery)
}
