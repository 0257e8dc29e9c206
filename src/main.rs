use chrono::Local;
use clap::Parser;
use whalesounds::{info_time, process::process_site, warn_time, Args, Config};

#[tokio::main]
async fn main() {
    let start_time = Local::now();

    let result = match Config::from_args(Args::parse()) {
        Ok(config) => process_site(&config).await.map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        if e.is_fatal() {
            warn_time!("{}. Exiting.", e);
        } else {
            warn_time!("whalesounds internal error: {}", e);
        }
        std::process::exit(e.exit_code());
    }

    info_time!(start_time, "Full program time:");
}
