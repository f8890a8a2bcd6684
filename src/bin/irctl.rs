// src/bin/irctl.rs

//! Command-line controller for an IR bridge on a serial port.
//!
//! ```bash
//! irctl --port /dev/ttyUSB0 send NEC 20DF10EF
//! irctl --port /dev/ttyUSB0 send TX 38000 9000,4500,560,560,560,1690
//! irctl --port /dev/ttyUSB0 recv
//! ```
//!
//! Set `RUST_LOG=debug` to see every line on the wire.

use clap::{Parser, Subcommand};
use irlink::controller::{IrLink, LinkConfig, SerialOptions, SyncController, TimeoutPolicy};
use irlink::IrError;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "irctl", about = "Send IR commands and read captures over a serial link")]
struct Args {
    /// Serial device of the bridge.
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    #[arg(short, long, default_value_t = irlink::common::timing::BAUD_RATE)]
    baud: u32,

    /// Report a silent device as success for transmits.
    #[arg(long)]
    assume_delivered: bool,

    /// Override the transmit attempt count.
    #[arg(long)]
    attempts: Option<u32>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Transmit `NEC <HEX8>` or `TX <freqHz> <us,us,...>`.
    Send {
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,
    },
    /// Fetch the last capture from the device.
    Recv,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let channel = SerialOptions::new()
        .baud_rate(args.baud)
        .poll_timeout(Duration::from_millis(5))
        .open(&args.port)?;

    let mut config = LinkConfig::default();
    if args.assume_delivered {
        config.timeout_policy(TimeoutPolicy::AssumeDelivered);
    }
    if let Some(attempts) = args.attempts {
        let mut policy = config.transmit;
        policy.max_attempts = attempts.max(1);
        config.transmit_policy(policy);
    }
    let link = IrLink::new(SyncController::with_config(channel, config));

    match args.command {
        Cmd::Send { request } => {
            let mut line = request.join(" ");
            line.push('\n');
            match link.store_transmit(line.as_bytes()) {
                Ok(_) => print!("{}", link.show_transmit()),
                Err(IrError::Validation(e)) => {
                    eprintln!("{}", e);
                    eprintln!("{}", e.usage());
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Cmd::Recv => {
            link.store_receive(b"LAST_RECV\n")?;
            print!("{}", link.show_receive());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
