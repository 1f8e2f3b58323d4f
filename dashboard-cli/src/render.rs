//! Plain-text views over coordinator snapshots.

use chrono::Local;
use dashboard_core::{
    AddOutcome, CitySummary, ListSnapshot, Notice, NoticeLevel, PendingOp, RemoveOutcome,
    SyncPhase, TimeSeriesPoint,
};

pub fn summary(snapshot: &ListSnapshot) -> String {
    let mut out = String::new();

    if let Some(notice) = &snapshot.notice {
        out.push_str(&notice_line(notice));
        out.push('\n');
    }

    match &snapshot.phase {
        SyncPhase::Uninitialized => {
            if snapshot.notice.is_none() {
                out.push_str("Loading...\n");
            }
            return out;
        }
        SyncPhase::Mutating(PendingOp::Add(text)) => out.push_str(&format!("(adding '{text}'...)\n")),
        SyncPhase::Mutating(PendingOp::Remove(key)) => out.push_str(&format!("(removing {key}...)\n")),
        SyncPhase::Ready => {}
    }

    if snapshot.cities.is_empty() {
        out.push_str("No cities watched yet. Add one to get started.\n");
    } else {
        let (day, night) = snapshot.cities.partition_day_night();
        for (title, group) in [("Day", day), ("Night", night)] {
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("== {title} ==\n"));
            for city in group {
                out.push_str(&card(city));
                out.push('\n');
            }
        }
    }

    if let Some(at) = snapshot.refreshed_at {
        out.push_str(&format!("updated {}\n", at.with_timezone(&Local).format("%H:%M:%S")));
    }

    out
}

fn card(city: &CitySummary) -> String {
    let local_time = city
        .current_time
        .as_deref()
        .and_then(|t| t.split(' ').next())
        .unwrap_or("--:--");

    format!(
        "{:<24} {:>7} (feels {:>7})  humidity {:>4}  wind {:>8}  {:<12} {}",
        format!("{}, {}", city.name, city.country_code),
        measure(city.temperature, "°C"),
        measure(city.feels_like, "°C"),
        city.humidity.map(|h| format!("{h:.0}%")).unwrap_or_else(|| "n/a".to_string()),
        measure(city.wind_speed, " m/s"),
        city.main.as_deref().unwrap_or(""),
        local_time,
    )
}

pub fn detail(city: &CitySummary, forecast: Option<&[TimeSeriesPoint]>) -> String {
    let mut out = format!("Detailed weather statistics for {}, {}\n", city.name, city.country_code);

    let day = if city.is_day { "Day" } else { "Night" };
    out.push_str(&format!("{day}, {}\n", city.description.as_deref().unwrap_or("no description")));
    out.push_str("--\n");
    out.push_str(&format!("Temperature: {}\n", measure(city.temperature, "°C")));
    out.push_str(&format!("Feels like:  {}\n", measure(city.feels_like, "°C")));
    out.push_str(&format!("Humidity:    {}\n", measure(city.humidity, "%")));
    out.push_str(&format!("Wind speed:  {}\n", measure(city.wind_speed, " m/s")));
    out.push_str("--\n");
    out.push_str(&format!("Local time:  {}\n", city.current_time.as_deref().unwrap_or("n/a")));
    out.push_str(&format!("Sunrise:     {}\n", city.sunrise_readable.as_deref().unwrap_or("n/a")));
    out.push_str(&format!("Sunset:      {}\n", city.sunset_readable.as_deref().unwrap_or("n/a")));
    if let (Some(lat), Some(lon)) = (&city.lat, &city.lon) {
        out.push_str(&format!("Coordinates: {lat} {lon}\n"));
    }
    if let Some(observed) = city.observed_at() {
        out.push_str(&format!("Observed:    {}\n", observed.format("%Y-%m-%d %H:%M UTC")));
    }

    out.push_str("--\nPredicted temperature:\n");
    match forecast {
        Some([]) => out.push_str("  no forecast points\n"),
        Some(points) => {
            for point in points {
                let date = point.date.as_deref().unwrap_or("");
                out.push_str(&format!("  {date:<10} {:>5}  {:>6.1}°C\n", point.time, point.temperature));
            }
        }
        None => out.push_str("  forecast unavailable\n"),
    }

    out
}

pub fn add_outcome(outcome: &AddOutcome) -> String {
    match outcome {
        AddOutcome::Added(key) => format!("Added {key}."),
        AddOutcome::AlreadyExists(key) => format!("City '{key}' already exists!"),
    }
}

pub fn remove_outcome(outcome: &RemoveOutcome) -> String {
    match outcome {
        RemoveOutcome::Removed(key) => format!("Removed {key}."),
        RemoveOutcome::NotPresent(key) => format!("City '{key}' was not in the list."),
    }
}

fn notice_line(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

fn measure(value: Option<f64>, unit: &str) -> String {
    value.map(|v| format!("{v:.1}{unit}")).unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{CityKey, WatchList};

    fn city(name: &str, cc: &str, is_day: bool) -> CitySummary {
        CitySummary {
            temperature: Some(3.44),
            current_time: Some("14:05 14.11.2023".into()),
            is_day,
            ..CitySummary::new(CityKey::new(name, cc))
        }
    }

    fn ready(cities: Vec<CitySummary>) -> ListSnapshot {
        ListSnapshot {
            phase: SyncPhase::Ready,
            cities: WatchList::new(cities).unwrap(),
            notice: None,
            refreshed_at: None,
        }
    }

    #[test]
    fn summary_groups_day_before_night() {
        let out = summary(&ready(vec![city("Taipei", "TW", false), city("Prague", "CZ", true)]));

        let day = out.find("== Day ==").unwrap();
        let prague = out.find("Prague, CZ").unwrap();
        let night = out.find("== Night ==").unwrap();
        let taipei = out.find("Taipei, TW").unwrap();
        assert!(day < prague && prague < night && night < taipei);
        assert!(out.contains("3.4°C"));
        assert!(out.contains("14:05"));
    }

    #[test]
    fn summary_of_failed_load_shows_error_only() {
        let snapshot = ListSnapshot {
            phase: SyncPhase::Uninitialized,
            cities: WatchList::empty(),
            notice: Some(Notice {
                level: NoticeLevel::Error,
                message: "Failed to load cities (server answered 500).".into(),
            }),
            refreshed_at: None,
        };

        let out = summary(&snapshot);
        assert_eq!(out, "[error] Failed to load cities (server answered 500).\n");
    }

    #[test]
    fn empty_list_has_hint() {
        assert!(summary(&ready(vec![])).contains("No cities watched yet"));
    }

    #[test]
    fn detail_lists_forecast_points() {
        let points = vec![TimeSeriesPoint {
            date: Some("14.11.2023".into()),
            time: "15:00".into(),
            temperature: 3.1,
        }];

        let out = detail(&city("Prague", "CZ", true), Some(points.as_slice()));
        assert!(out.starts_with("Detailed weather statistics for Prague, CZ"));
        assert!(out.contains("Day, no description"));
        assert!(out.contains("15:00"));
        assert!(out.contains("3.1°C"));

        let out = detail(&city("Prague", "CZ", false), None);
        assert!(out.contains("Night,"));
        assert!(out.contains("forecast unavailable"));
    }

    #[test]
    fn outcomes_read_naturally() {
        let key = CityKey::new("Paris", "FR");
        assert_eq!(add_outcome(&AddOutcome::AlreadyExists(key.clone())), "City 'Paris,FR' already exists!");
        assert_eq!(remove_outcome(&RemoveOutcome::Removed(key)), "Removed Paris,FR.");
    }
}
