//! squarewave CLI: play or render a song.
//!
//! Usage:
//!   squarewave path/to/song.mid
//!   squarewave path/to/song.sqw --wav output.wav
//!   squarewave path/to/song.mid --export song.sqw --bpm 90

use std::io::Write;
use std::path::Path;
use std::time::Duration;
use std::{env, fs, process};

use sw_master::{Controller, SAMPLE_RATE};

#[cfg(feature = "alloc_check")]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

const USAGE: &str =
    "Usage: squarewave <song.mid|song.sqw> [--wav out.wav] [--export out.sqw] [--bpm N] [--seconds N]";

/// Longest offline render when `--seconds` isn't given.
const DEFAULT_MAX_SECONDS: u32 = 300;

struct Options {
    input: String,
    wav: Option<String>,
    export: Option<String>,
    bpm: Option<f32>,
    max_seconds: u32,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = parse_args(&args).unwrap_or_else(|msg| {
        eprintln!("{}", msg);
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let mut ctrl = Controller::new();
    ctrl.load_path(Path::new(&opts.input)).unwrap_or_else(|e| {
        eprintln!("Failed to load {}: {}", opts.input, e);
        process::exit(1);
    });

    if let Some(bpm) = opts.bpm {
        let mut song = ctrl.song().clone();
        song.bpm = bpm;
        ctrl.set_song(song);
    }

    let song = ctrl.song();
    println!("Title:    {}", song.title);
    println!("Tempo:    {} BPM", song.bpm);
    println!("Events:   {}", song.len());
    println!("Ticks:    {}", song.total_ticks());
    println!();

    if let Some(path) = &opts.export {
        export_song(&ctrl, path);
    }

    match &opts.wav {
        Some(path) => render_to_wav(&ctrl, path, opts.max_seconds),
        // Exporting alone doesn't play
        None if opts.export.is_some() => {}
        None => play_audio(&mut ctrl),
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut input = None;
    let mut wav = None;
    let mut export = None;
    let mut bpm = None;
    let mut max_seconds = DEFAULT_MAX_SECONDS;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--wav" => wav = Some(value(&mut iter, arg)?.clone()),
            "--export" => export = Some(value(&mut iter, arg)?.clone()),
            "--bpm" => {
                let raw = value(&mut iter, arg)?;
                let parsed: f32 = raw.parse().map_err(|_| format!("Invalid bpm: {}", raw))?;
                if !parsed.is_finite() || parsed <= 0.0 {
                    return Err(format!("Invalid bpm: {}", raw));
                }
                bpm = Some(parsed);
            }
            "--seconds" => {
                let raw = value(&mut iter, arg)?;
                max_seconds = raw.parse().map_err(|_| format!("Invalid seconds: {}", raw))?;
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            path if input.is_none() => input = Some(path.to_string()),
            extra => return Err(format!("Unexpected argument: {}", extra)),
        }
    }

    Ok(Options {
        input: input.ok_or("Missing input file")?,
        wav,
        export,
        bpm,
        max_seconds,
    })
}

fn value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a String, String> {
    iter.next().ok_or_else(|| format!("{} needs a value", flag))
}

fn export_song(ctrl: &Controller, path: &str) {
    let bytes = ctrl.export_song().unwrap_or_else(|e| {
        eprintln!("Failed to encode song: {}", e);
        process::exit(1);
    });
    fs::write(path, &bytes).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", path, e);
        process::exit(1);
    });
    println!("Exported {} bytes to {}", bytes.len(), path);
}

fn play_audio(ctrl: &mut Controller) {
    if let Err(e) = ctrl.play() {
        eprintln!("Playback failed: {}", e);
        process::exit(1);
    }
    println!("Playing...");
    println!();

    while ctrl.is_playing() {
        if let Some(pos) = ctrl.position() {
            print!("\rEvent: {:5} | Voices: {}", pos, ctrl.active_voices());
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    ctrl.stop();

    println!("\rDone.                          ");
}

fn render_to_wav(ctrl: &Controller, path: &str, max_seconds: u32) {
    println!("Rendering to {} at {} Hz...", path, SAMPLE_RATE);

    let wav = ctrl.render_to_wav(max_seconds).unwrap_or_else(|e| {
        eprintln!("Failed to render: {}", e);
        process::exit(1);
    });
    println!("Rendered {} bytes", wav.len());

    fs::write(path, &wav).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", path, e);
        process::exit(1);
    });

    println!("Done.");
}
