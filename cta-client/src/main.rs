use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use cta_client::{
    ArrivalsQuery, CtaClient, CtaError, Route, StationClient, StationClientConfig, Stations,
    TrainRow, TrainTable,
};

/// Damen (Blue Line).
const DEFAULT_MAP_ID: u32 = 40590;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let map_id = match std::env::args().nth(1).map(|s| s.parse::<u32>()) {
        None => DEFAULT_MAP_ID,
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            eprintln!("Invalid station id: {e}");
            eprintln!("Usage: cta [MAPID]");
            return ExitCode::FAILURE;
        }
    };

    let client = match CtaClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = train_endpoints(&client, map_id) {
        eprintln!("Request failed: {e}");
        return ExitCode::FAILURE;
    }

    if let Err(e) = station_lookup() {
        eprintln!("Station lookup failed: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn train_endpoints(client: &CtaClient, map_id: u32) -> Result<(), CtaError> {
    let arrivals = client.arrivals(&ArrivalsQuery::stations(map_id))?.to_table()?;
    println!("Arrivals for station {map_id}:");
    print_rows(&arrivals);

    // Follow is not always reliable; try run numbers until one answers
    for run in arrivals.iter().filter_map(|row| row.rn.as_deref()) {
        match client.follow(run).and_then(|r| r.to_table()) {
            Ok(rows) => {
                println!();
                println!("Next stops for run {run}:");
                print_rows(&rows);
                break;
            }
            Err(e) => eprintln!("Could not follow run {run}: {e}"),
        }
    }

    let blue = client.locations(Route::Blue)?.to_table()?;
    println!();
    println!("Blue Line trains: {}", blue.len());
    print_rows(&blue);

    Ok(())
}

fn station_lookup() -> Result<(), cta_client::StationError> {
    let client = StationClient::new(StationClientConfig::new())?;
    let stations = Stations::fetch(&client)?;
    println!();
    println!("Loaded {} stops", stations.len());

    for stop in stations.lookup("Damen", Some(Route::Blue)) {
        println!(
            "  {:<40} mapid={} stpid={}",
            stop.stop_name, stop.map_id, stop.stop_id
        );
    }

    Ok(())
}

fn print_rows(rows: &[TrainRow]) {
    for row in rows {
        println!(
            "  run {:>4} {:<6} to {:<24} next {:<24} in {:>5.1} min{}",
            row.rn.as_deref().unwrap_or("?"),
            row.route.as_deref().or(row.rt.as_deref()).unwrap_or(""),
            row.dest_nm.as_deref().unwrap_or("?"),
            row.sta_nm
                .as_deref()
                .or(row.next_sta_nm.as_deref())
                .unwrap_or("?"),
            row.mins_til_arrival,
            if row.is_delayed() { " (delayed)" } else { "" },
        );
    }
}
