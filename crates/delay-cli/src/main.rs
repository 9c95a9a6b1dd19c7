//! Delayed Channel Command-Line Driver
//!
//! Feeds messages into a delayed channel, performs read events and prints
//! the results. Payloads and the raw buffer go to stdout; logs go to
//! stderr.

mod args;

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use delay_sim::DelayedChannel;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Options;

/// Longest possible delay prefix: 20 digits of u64 plus the hyphen
const MAX_PREFIX_LEN: usize = 21;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slowrw=info,delay_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let options = Options::parse();
    run(&options, io::stdin(), &mut io::stdout()).await
}

/// Fill the channel, perform the read events, then print the raw buffer
///
/// `input` is only consumed when no messages were given.
async fn run<R, W>(options: &Options, mut input: R, out: &mut W) -> Result<()>
where
    R: Read,
    W: Write,
{
    let config = options.channel_config()?;
    info!("Starting delayed channel with delays {:?} ms", config.delays_ms);
    let channel = DelayedChannel::from_config(config);

    if options.messages.is_empty() {
        let mut data = Vec::new();
        input
            .read_to_end(&mut data)
            .context("failed to read stdin")?;
        channel.write(&data);
    } else {
        for message in &options.messages {
            channel.write(message.as_bytes());
        }
    }
    debug!("Buffered {} bytes", channel.len());

    for index in 0..options.reads {
        let mut dst = vec![0u8; MAX_PREFIX_LEN + channel.len()];
        let event = channel
            .read(&mut dst)
            .await
            .with_context(|| format!("read event {} failed", index + 1))?;
        info!(
            "Read event {} delivered {} bytes after {}ms",
            index + 1,
            event.len,
            event.delay_ms
        );

        out.write_all(&dst[..event.len])?;
        out.write_all(b"\n")?;
        out.flush()?;
    }

    if options.newline {
        channel.print_bufferln_to(out)?;
    } else {
        channel.print_buffer_to(out)?;
    }

    Ok(())
}
