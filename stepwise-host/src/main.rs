//! stepwise-host - send a gain, receive and store the step response
//!
//! Interactive by default: `run` prompts for a gain and waits for the
//! dataset, `clear` drops the rendered runs, `quit` releases the link.
//! With `--gain` a single run is performed and the program exits.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use stepwise_host::{
    prompt_gain, CsvSink, DatasetSink, HostConfig, HostError, LogSink, SerialLink, Session,
};
use stepwise_protocol::GainCommand;

#[derive(Parser, Debug)]
#[command(
    name = "stepwise-host",
    about = "Send a proportional gain to the step response rig and record the result"
)]
struct Cli {
    /// Configuration file (defaults to ./stepwise.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port, overrides the configuration file
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overrides the configuration file
    #[arg(short, long)]
    baud: Option<u32>,

    /// Perform one run with this gain, then exit
    #[arg(short, long)]
    gain: Option<String>,

    /// Write each dataset as CSV into this directory
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Clear,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "run" | "r" => Some(Command::Run),
            "clear" | "c" => Some(Command::Clear),
            "quit" | "q" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// How long shutdown waits for a stdin read still parked on a blocking thread
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let result = runtime.block_on(serve(cli));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn serve(cli: Cli) -> Result<()> {
    let mut config = HostConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(port) = cli.port {
        config.link.port = port;
    }
    if let Some(baud) = cli.baud {
        config.link.baud_rate = baud;
    }
    if let Some(dir) = cli.csv_dir {
        config.output.csv_dir = Some(dir);
    }
    config.validate().context("invalid configuration")?;

    let link = SerialLink::open(&config.link)
        .with_context(|| format!("opening serial port '{}'", config.link.port))?;
    info!("Connected to {} at {} baud", link.name(), config.link.baud_rate);

    let mut sinks: Vec<Box<dyn DatasetSink>> = vec![Box::new(LogSink::new())];
    if let Some(dir) = &config.output.csv_dir {
        let sink = CsvSink::new(dir).context("preparing CSV output")?;
        sinks.push(Box::new(sink));
    }
    let mut session = Session::new(link, sinks);

    if let Some(gain) = cli.gain {
        let gain = GainCommand::parse(&gain)
            .map_err(HostError::from)
            .context("parsing --gain")?;
        run_once(&mut session, gain).await?;
        return session.quit().context("releasing link");
    }

    interactive(&mut session).await?;
    session.quit().context("releasing link")
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

async fn run_once(session: &mut Session<SerialLink>, gain: GainCommand) -> Result<()> {
    match session.run(gain).await {
        Ok(dataset) => {
            info!("Run complete: {} points", dataset.len());
            Ok(())
        }
        Err(HostError::Interrupted) => {
            warn!("Run interrupted, link released");
            Err(HostError::Interrupted.into())
        }
        Err(e) => Err(e).context("run failed"),
    }
}

async fn interactive(session: &mut Session<SerialLink>) -> Result<()> {
    println!("Commands: run, clear, quit");
    loop {
        let line = tokio::select! {
            line = read_stdin_line("> ") => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };

        match Command::parse(&line) {
            Some(Command::Run) => {
                let prompt = tokio::task::spawn_blocking(|| {
                    prompt_gain(&mut io::stdin().lock(), &mut io::stdout())
                });
                let gain = tokio::select! {
                    gain = prompt => gain??,
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupt received");
                        return Ok(());
                    }
                };
                let Some(gain) = gain else {
                    return Ok(());
                };
                match session.run(gain).await {
                    Ok(dataset) => info!("Run complete: {} points", dataset.len()),
                    Err(HostError::Interrupted) => {
                        warn!("Run interrupted, link released");
                        return Err(HostError::Interrupted.into());
                    }
                    Err(e) => error!("Run failed: {}", e),
                }
            }
            Some(Command::Clear) => session.clear().context("clearing output")?,
            Some(Command::Quit) => return Ok(()),
            None if line.trim().is_empty() => {}
            None => println!("Unknown command '{}'; use run, clear or quit", line.trim()),
        }
    }
}

/// Read one line from stdin without blocking the runtime
async fn read_stdin_line(prompt: &'static str) -> Result<Option<String>> {
    let line = tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    })
    .await??;
    Ok(line)
}
