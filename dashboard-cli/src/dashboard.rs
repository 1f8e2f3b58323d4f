//! Interactive dashboard: one coordinator for the whole session.

use std::fmt;

use dashboard_core::{CityKey, CityListCoordinator, ViewRouter, WatchList, WeatherDirectory};
use inquire::{InquireError, Select, Text};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Remove,
    Details,
    Refresh,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Add => "Add city",
            Action::Remove => "Remove city",
            Action::Details => "Show city details",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        })
    }
}

pub async fn run<D: WeatherDirectory>(coordinator: &CityListCoordinator<D>) -> anyhow::Result<()> {
    let mut updates = coordinator.subscribe();
    let mut router = ViewRouter::new();

    loop {
        let snapshot = updates.borrow_and_update().clone();
        print!("{}", render::summary(&snapshot));

        let actions = if snapshot.mutations_enabled() {
            vec![Action::Add, Action::Remove, Action::Details, Action::Refresh, Action::Quit]
        } else {
            vec![Action::Refresh, Action::Quit]
        };

        let Some(action) = cancellable(Select::new("What next?", actions).prompt())? else {
            break;
        };

        // Flow failures are published as notices and shown on the next pass.
        match action {
            Action::Add => {
                if let Some(text) = cancellable(Text::new("City name:").prompt())? {
                    let _ = coordinator.add_city_flow(&text).await;
                }
            }
            Action::Remove => {
                if let Some(key) = pick_city(&snapshot.cities)? {
                    let _ = coordinator.remove_city_flow(&key).await;
                }
            }
            Action::Details => {
                if let Some(key) = pick_city(&snapshot.cities)? {
                    router.select(key);
                    match detail_view(coordinator, &mut router).await {
                        Some(text) => print!("{text}"),
                        None => println!("That city is no longer watched."),
                    }
                    router.back();
                }
            }
            Action::Refresh => {
                let _ = coordinator.refresh().await;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

/// Render the router's selected city with its forecast, or `None` if the
/// selection is not in the current list.
pub async fn detail_view<D: WeatherDirectory>(
    coordinator: &CityListCoordinator<D>,
    router: &mut ViewRouter,
) -> Option<String> {
    let cities = coordinator.cities();
    let city = router.resolve(&cities)?;

    let forecast = match coordinator.directory().timeseries(&city.key()).await {
        Ok(points) => Some(points),
        Err(err) => {
            tracing::warn!(city = %city.key(), error = %err, "forecast unavailable");
            None
        }
    };

    Some(render::detail(city, forecast.as_deref()))
}

/// Menu over the watched cities, in list order.
pub fn pick_city(cities: &WatchList) -> anyhow::Result<Option<CityKey>> {
    if cities.is_empty() {
        println!("No cities watched yet.");
        return Ok(None);
    }
    cancellable(Select::new("Choose a city:", cities.keys()).prompt())
}

/// Esc / Ctrl-C on a prompt means "never mind", not an error.
fn cancellable<T>(answer: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
