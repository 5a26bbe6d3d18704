use std::net::SocketAddr;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "mock_server", disable_version_flag = true)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "MOCK_SERVER_ADDR", default_value = "127.0.0.1:8000")]
    addr: SocketAddr,
    /// Log filter directive (e.g. `mock_server=debug`).
    #[arg(long, env = "MOCK_SERVER_LOG", default_value = "mock_server=info")]
    log: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt().with_env_filter(args.log).init();

    mock_server::run(args.addr).await;
}
