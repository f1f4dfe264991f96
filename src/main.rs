use clap::Parser;
use live_poll::config::{Cli, Command};
use live_poll::{client, logging, server};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => {
            logging::init(args.json_logs);
            server::run(args.socket_addr()).await
        }
        // The client owns the terminal, so it runs without a log subscriber
        Command::Client(args) => client::run(args.host, args.port).await,
        Command::Probe(args) => {
            logging::init(args.json_logs);
            client::probe::run(&args.connect.url(), args.question.clone(), args.vote, args.timeout())
                .await
                .map(|question| {
                    println!(
                        "Vote applied: {} \"{}\" rating {}",
                        question.id, question.text, question.rating
                    );
                })
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
