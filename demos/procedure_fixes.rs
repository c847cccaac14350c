use std::{env::args_os, io, path::Path};

use atc_procedures::catalog::ProcedureCatalog;

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let path = args_os().nth(1).expect("missing argument: path to airport .json");
    let catalog = ProcedureCatalog::from_path(Path::new(&path)).expect("unsuccessful parse");

    match catalog.all_fix_names_in_use() {
        Ok(names) => println!("{}", serde_json::to_string(&names).unwrap()),
        Err(e) => eprintln!("{e}"),
    }
}
