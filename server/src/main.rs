use clap::Parser;
use log::info;
use server::network::Server;
use shared::{Court, MatchConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Simulation ticks per second
    #[arg(short, long, default_value = "30")]
    tick_rate: u32,

    /// Serve-lock duration in milliseconds
    #[arg(long, default_value = "2000")]
    serve_delay: u64,

    /// Points needed to win a match
    #[arg(long, default_value = "11")]
    win_score: u8,

    /// Maximum simultaneous participants
    #[arg(short, long, default_value = "32")]
    max_participants: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = MatchConfig {
        tick_rate: args.tick_rate,
        serve_delay_ms: args.serve_delay as f32,
        win_score: args.win_score,
        ..MatchConfig::default()
    };

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, Court::default(), config, args.max_participants).await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, shutting down");
            Ok(())
        }
    }
}
