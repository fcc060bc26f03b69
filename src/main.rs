//! HomeNet simulator — real-time driver for the network model.
//!
//! ```text
//!  ┌──────────────┐   OPERATOR_CHANNEL   ┌─────────────────────────────────────┐
//!  │ stdin thread │ ───────────────────▶ │  edge_executor::LocalExecutor       │
//!  │ parse_line() │                      │                                     │
//!  └──────────────┘                      │  ┌─────────────┐  ┌──────────────┐  │
//!                                        │  │ clock task  │  │ operator task│  │
//!                                        │  │ tick_ms ⏱   │  │ wake-on-line │  │
//!                                        │  └──────┬──────┘  └──────┬───────┘  │
//!                                        │         └──── Rc<RefCell<Network>>  │
//!                                        └─────────────────────────────────────┘
//! ```
//!
//! Usage: `homenet-sim [config.json]`.  Log verbosity follows `RUST_LOG`
//! (default `info`).

use std::cell::RefCell;
use std::io::{self, BufRead};
use std::rc::Rc;
use std::time::Duration;
use std::{env, fs, thread};

use anyhow::{Result, anyhow};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use homenet::adapters::entropy::SeededEntropy;
use homenet::adapters::log_sink::LogEventSink;
use homenet::config::{NetworkConfig, SimulatorConfig};
use homenet::operator::{self, OperatorInput};
use homenet::{Error, Network};

type SimNetwork = Network<LogEventSink, SeededEntropy>;
type SharedNetwork = Rc<RefCell<SimNetwork>>;

/// Console lines waiting for the operator task.
static OPERATOR_CHANNEL: Channel<CriticalSectionRawMutex, OperatorInput, 8> = Channel::new();

fn load_config() -> Result<NetworkConfig> {
    let Some(path) = env::args().nth(1) else {
        info!("No config file given, using defaults");
        return Ok(NetworkConfig::default());
    };
    let text = fs::read_to_string(&path).map_err(|e| anyhow!("reading {path}: {e}"))?;
    let config: NetworkConfig =
        serde_json::from_str(&text).map_err(|e| anyhow!("parsing {path}: {e}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

// ── Console thread ───────────────────────────────────────────

fn spawn_console() -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console".into())
        .spawn(|| {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match operator::parse_line(&line) {
                    Ok(input) => {
                        futures_lite::future::block_on(OPERATOR_CHANNEL.send(input));
                        if input == OperatorInput::Quit {
                            return;
                        }
                    }
                    Err(e) => warn!("console: {}", e),
                }
            }
            // stdin closed
            futures_lite::future::block_on(OPERATOR_CHANNEL.send(OperatorInput::Quit));
        })
}

// ── Tasks ────────────────────────────────────────────────────

/// Advance the virtual clock by `tick_ms * speed` every `tick_ms` of
/// wall time.
async fn clock_loop(network: SharedNetwork, pacing: SimulatorConfig) {
    let step = pacing.tick_ms.saturating_mul(pacing.speed);
    loop {
        async_io_mini::Timer::after(Duration::from_millis(u64::from(pacing.tick_ms))).await;
        network.borrow_mut().advance(step);
    }
}

/// Apply operator input until `quit`.
async fn operator_loop(network: SharedNetwork) {
    loop {
        let input = OPERATOR_CHANNEL.receive().await;
        if !network.borrow_mut().apply(input) {
            info!("Operator quit");
            return;
        }
    }
}

// ── Main ─────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  HomeNet simulator v{}            ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config()?;
    config.validate().map_err(Error::from)?;
    let pacing = config.simulator;

    let network: SharedNetwork = Rc::new(RefCell::new(Network::new(
        &config,
        LogEventSink::new(),
        SeededEntropy::new(pacing.seed),
    )));
    let _console = spawn_console()?;

    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    executor.spawn(clock_loop(network.clone(), pacing)).detach();

    info!(
        "Simulator running: tick {} ms, speed x{}, seed {:#x}",
        pacing.tick_ms, pacing.speed, pacing.seed
    );
    info!("Commands: press <node> | th <n> | humidity|temperature|light <n> | status | quit");

    futures_lite::future::block_on(executor.run(operator_loop(network.clone())));

    let net = network.borrow();
    info!("{}", net.snapshot());
    info!("{} events logged", net.sink().emitted());
    Ok(())
}
