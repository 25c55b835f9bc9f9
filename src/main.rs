extern crate nalgebra as na;

use crate::cli::CliArgs;
use crate::dispatcher::QueryDispatcher;
use crate::frame::{ConsoleSink, FrameLoop, MonotonicClock};
use crate::input::{IntervalTrigger, StdinTrigger, TriggerSource};
use crate::presenter::ResultPresenter;
use anyhow::Context;
use clap::Parser;
use raylink_api_types::protocol;
use std::time::Duration;

mod aim;
mod cli;
mod dispatcher;
mod frame;
mod input;
mod presenter;

fn main() -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = CliArgs::parse();

    log::info!("connecting to {}:{}", args.address, args.port);
    let connection = protocol::connect((args.address.as_str(), args.port), args.need_ack)
        .with_context(|| format!("unable to connect to {}:{}", args.address, args.port))?;
    log::info!("connected to {}", connection.peer_addr());

    let trigger: Box<dyn TriggerSource> = match args.fire_every_ms {
        Some(every) => Box::new(IntervalTrigger::new(Duration::from_millis(every))),
        None => {
            println!("Press Enter to cast a ray, Ctrl-D to quit.");
            Box::new(StdinTrigger::spawn())
        }
    };

    let aim = args.aim();
    let segment = aim.query();
    log::info!("casting rays from {} to {}", segment.start, segment.end);

    let mut frames = FrameLoop::new(
        aim,
        QueryDispatcher::new(connection, args.round_trip_policy()),
        ResultPresenter::new(args.expiry()),
        trigger,
        MonotonicClock::new(),
        ConsoleSink::default(),
    )
    .blocking(args.blocking);

    let ran = frames
        .run(args.frame_period(), args.max_frames)
        .context("raycast session ended")?;

    log::info!(
        "stopped after {ran} frames ({} triggers ignored while a query was in flight)",
        frames.dispatcher().ignored_triggers()
    );

    Ok(())
}
