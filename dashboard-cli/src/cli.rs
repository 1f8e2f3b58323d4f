use anyhow::bail;
use clap::{Parser, Subcommand};
use dashboard_core::{
    CityKey, CityListCoordinator, Config, FlowError, HttpDirectory, ViewRouter, WeatherDirectory,
    directory_from_config,
};
use inquire::{CustomType, Text};

use crate::{dashboard, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather for a list of watched cities")]
pub struct Cli {
    /// Weather API base URL for this run, overriding the saved config.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive dashboard (the default).
    Dashboard,

    /// Print every watched city, day cities first.
    Summary,

    /// Add a city to the watch-list.
    Add {
        /// City name, optionally followed by ",<country code>", e.g. "paris, fr".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Remove a city from the watch-list.
    Remove {
        /// City name as listed, e.g. "New York".
        name: String,
        /// Country code as listed, e.g. "US".
        country_code: String,
    },

    /// Show details and the temperature forecast for one city.
    Show {
        /// City name as listed; omit both arguments to pick from a menu.
        #[arg(requires = "country_code")]
        name: Option<String>,
        country_code: Option<String>,
    },

    /// Configure where the weather API lives.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let base_url = self.base_url.as_deref();

        match self.command.unwrap_or(Command::Dashboard) {
            Command::Configure => configure(),
            Command::Dashboard => dashboard::run(&start(base_url).await?).await,
            Command::Summary => {
                let coordinator = start(base_url).await?;
                ensure_loaded(&coordinator)?;
                print!("{}", render::summary(&coordinator.snapshot()));
                Ok(())
            }
            Command::Add { city } => {
                let coordinator = start(base_url).await?;
                ensure_loaded(&coordinator)?;

                let outcome = coordinator.add_city_flow(&city.join(" ")).await.map_err(flow_error)?;
                println!("{}", render::add_outcome(&outcome));
                print!("{}", render::summary(&coordinator.snapshot()));
                Ok(())
            }
            Command::Remove { name, country_code } => {
                let coordinator = start(base_url).await?;
                ensure_loaded(&coordinator)?;

                let key = CityKey::new(name, country_code);
                let outcome = coordinator.remove_city_flow(&key).await.map_err(flow_error)?;
                println!("{}", render::remove_outcome(&outcome));
                print!("{}", render::summary(&coordinator.snapshot()));
                Ok(())
            }
            Command::Show { name, country_code } => {
                let coordinator = start(base_url).await?;
                ensure_loaded(&coordinator)?;

                let key = match (name, country_code) {
                    (Some(name), Some(country_code)) => CityKey::new(name, country_code),
                    _ => match dashboard::pick_city(&coordinator.cities())? {
                        Some(key) => key,
                        None => return Ok(()),
                    },
                };

                let mut router = ViewRouter::new();
                router.select(key.clone());
                match dashboard::detail_view(&coordinator, &mut router).await {
                    Some(text) => {
                        print!("{text}");
                        Ok(())
                    }
                    None => bail!("'{key}' is not in the watch-list."),
                }
            }
        }
    }
}

fn load_config(base_url: Option<&str>) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = base_url {
        config.set_base_url(url)?;
    }
    Ok(config)
}

async fn start(base_url: Option<&str>) -> anyhow::Result<CityListCoordinator<HttpDirectory>> {
    let config = load_config(base_url)?;
    let directory = directory_from_config(&config)?;
    tracing::debug!(base_url = directory.base_url(), "loading city list");
    Ok(CityListCoordinator::start(directory).await)
}

fn ensure_loaded<D: WeatherDirectory>(coordinator: &CityListCoordinator<D>) -> anyhow::Result<()> {
    if coordinator.is_ready() {
        return Ok(());
    }

    let message = coordinator
        .snapshot()
        .notice
        .map(|n| n.message)
        .unwrap_or_else(|| "Failed to load cities.".to_string());
    bail!(
        "{message}\n\
         Hint: check that the weather API is reachable, or run `weather-dashboard configure`."
    )
}

fn flow_error(err: FlowError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current = config.base_url().to_string();
    let base_url = Text::new("Weather API base URL:").with_default(&current).prompt()?;
    config.set_base_url(&base_url)?;

    let timeout = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.api.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()?;
    config.set_timeout_secs(timeout)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
