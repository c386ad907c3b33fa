//! blinkcode CLI
//!
//! Usage:
//!   blinkcode --text "SOS"                  # Encode text as blinks and decode it back
//!   blinkcode --text "SOS" --dump-trace     # Print the encoded frames as a trace
//!   blinkcode --trace frames.txt            # Decode a recorded trace
//!   blinkcode < frames.txt                  # Decode a trace from stdin
//!   blinkcode --serve                       # HTTP API server
//!   blinkcode --trace frames.txt --json     # JSON output

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blinkcode::core::{
    format_frames, run_server, BlinkDecoder, TimingProfile, TraceError, TraceReader,
};
use blinkcode::types::{StepOutput, TimedFrame};
use blinkcode::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "blinkcode",
    version = VERSION,
    about = "Blink-duration Morse decoder",
    long_about = "blinkcode turns eye-open/closed frames into text.\n\n\
                  A short blink (≤ 1.5s) is a dot, a long blink a dash.\n\
                  Keeping both eyes open ≥ 1.5s ends a letter, ≥ 3.5s ends a word.\n\n\
                  Trace format, one frame per line:\n  \
                  <timestamp_ms> <left> <right>\n  \
                  eyes are open probabilities in [0,1], or ? when unknown"
)]
struct Args {
    /// Text to encode as blinks and decode back (simulation)
    #[arg(short, long)]
    text: Option<String>,

    /// Trace file to decode ("-" for stdin)
    #[arg(long)]
    trace: Option<String>,

    /// With --text: print the encoded trace instead of decoding it
    #[arg(long)]
    dump_trace: bool,

    /// Frame period used by --text (milliseconds)
    #[arg(long, default_value_t = 50)]
    frame_ms: u64,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Print every frame, not only committed letters and words
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    if args.serve {
        run_server(&args.addr)
            .await
            .with_context(|| format!("server on {} failed", args.addr))?;
    } else if let Some(ref text) = args.text {
        run_text(text, &args)?;
    } else {
        let path = args.trace.as_deref().unwrap_or("-");
        run_trace(path, &args)?;
    }
    Ok(())
}

/// Encode text into frames, then decode or dump them
fn run_text(text: &str, args: &Args) -> Result<()> {
    let profile = TimingProfile {
        frame_ms: args.frame_ms,
        ..TimingProfile::default()
    };
    let frames = profile
        .encode(text, 0)
        .with_context(|| format!("cannot encode {:?}", text))?;
    info!(frames = frames.len(), "encoded text");

    if args.dump_trace {
        print!("{}", format_frames(&frames));
        return Ok(());
    }

    decode(frames.into_iter().map(Ok::<_, anyhow::Error>), args)
}

/// Decode a trace file or stdin
fn run_trace(path: &str, args: &Args) -> Result<()> {
    let reader: Box<dyn BufRead> = if path == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path).with_context(|| format!("cannot open trace {}", path))?;
        Box::new(BufReader::new(file))
    };

    let frames = TraceReader::new(reader).filter_map(|item| match item {
        Ok(frame) => Some(Ok(frame)),
        Err(e @ TraceError::T003_IO { .. }) => Some(Err(anyhow::Error::new(e))),
        Err(e) => {
            warn!("skipping {}", e);
            None
        }
    });
    decode(frames, args)
}

/// Feed frames through one decoder; the decoder starts at the first frame's time
fn decode<I>(frames: I, args: &Args) -> Result<()>
where
    I: Iterator<Item = Result<TimedFrame>>,
{
    let mut decoder = None;

    for timed in frames {
        let timed = timed?;
        let decoder = decoder.get_or_insert_with(|| {
            BlinkDecoder::new(|message: &str| info!("message: {:?}", message), timed.t_ms)
        });
        let output = decoder.observe(timed.frame, timed.t_ms);
        if args.verbose || output.emitted() {
            print_output(&output, args);
        }
    }

    let message = decoder.map(|d| d.current_message()).unwrap_or_default();
    if args.json {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{}", message.trim_end());
    }
    Ok(())
}

fn print_output(output: &StepOutput, args: &Args) {
    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("cannot serialize output: {}", e),
        }
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
        if output.emissions.iter().any(|e| e.is_word()) {
            println!("\x1b[32m  ✓ word committed\x1b[0m");
        }
    }
}
