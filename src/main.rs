use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use muralcli::{
    cli::{self, CliState},
    config::{self, Settings},
    error,
    management::{AuthManager, FileStore, InMemoryRateLimiter},
    spotify::SpotifyClient,
    types::{CollectionRequest, ImageQuality, TimeRange},
    validation,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Show whether a usable access token is stored
    Status,

    /// Forget stored tokens
    Logout,

    /// Collect album covers for a mural from your top tracks
    Mural(MuralOptions),

    /// Run the local HTTP API
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct MuralOptions {
    /// Number of columns (1-20)
    #[clap(long, value_parser = validation::parse_dimension)]
    pub width: u32,

    /// Number of rows (1-20, at most 200 cells in total)
    #[clap(long, value_parser = validation::parse_dimension)]
    pub height: u32,

    /// Image size: low, medium or high
    #[clap(long, default_value = "medium", value_parser = validation::parse_quality)]
    pub quality: ImageQuality,

    /// Listening period: short_term, medium_term or long_term
    #[clap(long, default_value = "medium_term", value_parser = validation::parse_time_range)]
    pub time_range: TimeRange,

    /// Print covers as JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn build_state(settings: Settings) -> CliState {
    let rate_limit = settings.rate_limit;
    let client = SpotifyClient::new(settings.clone());
    let store = FileStore::new(FileStore::default_path());
    CliState::new(
        AuthManager::new(settings, store, client),
        InMemoryRateLimiter::new(),
        rate_limit,
    )
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    let state = build_state(Settings::from_env());

    match cli.command {
        Command::Auth => cli::auth(state).await,
        Command::Status => cli::status(state).await,
        Command::Logout => cli::logout(state).await,
        Command::Mural(opt) => {
            let request =
                match CollectionRequest::new(opt.width, opt.height, opt.quality, opt.time_range) {
                    Ok(request) => request,
                    Err(e) => error!("{}", e),
                };
            cli::mural(state, request, opt.json).await
        }
        Command::Serve => cli::serve(state).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
