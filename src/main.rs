//! Binary entry point for the helpdesk dump tool.

use log::error;

#[tokio::main]
async fn main() {
    if let Err(err) = helpdesk_dumper_lib::run().await {
        error!("export failed: {}", err);
        std::process::exit(1);
    }
}
