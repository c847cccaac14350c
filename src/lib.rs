use std::io;

use tracing::warn;

pub mod catalog;
pub mod descriptor;
pub mod procedure;
pub mod token;
pub mod waypoint;

fn read_to_string(contents: &[u8]) -> Result<String, io::Error> {
    String::from_utf8(contents.to_vec()).or_else(|_| {
        let (string, _, errors) = encoding_rs::WINDOWS_1252.decode(contents);
        if errors {
            warn!("errors while decoding win-1252");
        }
        Ok(string.to_string())
    })
}
