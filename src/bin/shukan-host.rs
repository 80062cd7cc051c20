//! Framed JSON host for Shukan
//!
//! Reads length-prefixed requests from stdin and writes responses to stdout
//! until stdin is closed. Logs go to stderr; set `RUST_LOG` to adjust.

use log::{error, warn};
use shukan_lib::{config::HostConfig, host::Host, open_service};
use std::io;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match HostConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Initialization error: {e}");
            std::process::exit(1);
        }
    };

    let service = match open_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let mut host = Host::new(service, io::stdin().lock(), io::stdout().lock());
    if let Err(e) = host.run() {
        // A peer closing mid-frame ends the session without a failure exit
        if e.kind() == io::ErrorKind::UnexpectedEof {
            warn!("Input ended inside a frame: {e}");
        } else {
            error!("Host error: {e}");
            std::process::exit(1);
        }
    }
}
