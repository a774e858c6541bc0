//! Print every normalized keypress and mouse event.
//!
//! Run with `cargo run --example keypress`. Press `q` or Ctrl+C to quit.
//! `RUST_LOG=spark_tui_input=trace` shows the normalizer at work.

use std::cell::Cell;
use std::io::{self, Read, Write};
use std::rc::Rc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spark_tui_input::{
    on_key, on_keypress, on_mouse, Component, InputConfig, InputError, InputRuntime,
    MouseEventType, Result,
};

const IDLE_POLL: Duration = Duration::from_millis(250);

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Restores the terminal on every exit path.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture);
        let _ = disable_raw_mode();
    }
}

fn main() -> Result<()> {
    setup_logging();

    let config = match std::env::var("SPARK_INPUT_CONFIG") {
        Ok(path) => InputConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        Err(_) => InputConfig::default(),
    };
    let mut runtime = InputRuntime::new(config)?;
    let quit = Rc::new(Cell::new(false));

    let component = Component::new(runtime.context());
    let q = quit.clone();
    component.setup(|| {
        on_keypress(|raw| {
            let key = raw.key.as_deref().unwrap_or("<unclassified>");
            print!("key {key:<14} mods {:?} input {:?}\r\n", raw.modifiers, raw.input);
        });
        on_mouse(MouseEventType::Any, |event| {
            print!(
                "mouse {:?} {:?} at {},{}\r\n",
                event.kind, event.button, event.client_x, event.client_y
            );
        });
        on_key("q", move |event| {
            if event.modifiers.is_empty() {
                q.set(true);
            }
        });
        let q = quit.clone();
        on_key("c", move |event| {
            if event.modifiers.ctrl {
                q.set(true);
            }
        });
    });
    component.mount();

    let _raw = RawMode::enable()?;
    print!("press keys, q to quit\r\n");

    let (tx, rx) = mpsc::channel::<io::Result<Vec<u8>>>();
    thread::spawn(move || {
        let mut stdin = io::stdin();
        let mut buf = [0u8; 1024];
        loop {
            let chunk = stdin.read(&mut buf).map(|n| buf[..n].to_vec());
            let stop = !matches!(&chunk, Ok(bytes) if !bytes.is_empty());
            if tx.send(chunk).is_err() || stop {
                break;
            }
        }
    });

    while !quit.get() {
        let timeout = runtime
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| deadline.saturating_duration_since(Instant::now()));

        match rx.recv_timeout(timeout) {
            Ok(Ok(bytes)) if bytes.is_empty() => break,
            Ok(Ok(bytes)) => {
                runtime.feed(&bytes, Instant::now());
            }
            Ok(Err(err)) => return Err(InputError::Io(err)),
            Err(RecvTimeoutError::Timeout) => {
                runtime.tick(Instant::now());
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
        io::stdout().flush()?;
    }

    runtime.finish();
    component.unmount();
    Ok(())
}
