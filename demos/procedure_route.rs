use std::{env::args_os, io, path::Path};

use atc_procedures::{catalog::ProcedureCatalog, waypoint::Waypoint};

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let path = args_os().nth(1).expect("missing argument: path to airport .json");
    let arg = |n: usize, name: &str| {
        args_os()
            .nth(n)
            .unwrap_or_else(|| panic!("missing argument: {name}"))
            .into_string()
            .unwrap()
    };
    let icao = arg(2, "procedure identifier");
    let entry = arg(3, "entry");
    let catalog = ProcedureCatalog::from_path(Path::new(&path)).expect("unsuccessful parse");
    // without an exit argument, pick one like a departure spawn would
    let exit = args_os().nth(4).map_or_else(
        || {
            catalog
                .random_exit_point(&icao, &mut rand::rng())
                .unwrap()
                .to_string()
        },
        |exit| exit.into_string().unwrap(),
    );

    match catalog.waypoints_for::<Waypoint>(&icao, &entry, &exit) {
        Ok(waypoints) => println!("{}", serde_json::to_string(&waypoints).unwrap()),
        Err(e) => eprintln!("{e}"),
    }
}
