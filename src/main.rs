use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, bail};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;

use octobeat::audio;
use octobeat::bank_init::BankInitializer;
use octobeat::config::DEFAULT_BPM;
use octobeat::export;
use octobeat::loader;
use octobeat::{LoopingSampler, SampleBank};

const USAGE: &str = "\
octobeat — 8-channel step-sequencer sampler

Usage:
  octobeat loop --pattern <file.json> [--bpm <n>]
  octobeat pads <bank.json>
  octobeat init <dir> [--force] [--recursive]
  octobeat export <bank.json> <bank-number> <out-dir>
  octobeat export-set <in-dir> <out-dir>";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };

    match command.as_str() {
        "loop" => cmd_loop(&args[1..]),
        "pads" => cmd_pads(&args[1..]),
        "init" => cmd_init(&args[1..]),
        "export" => cmd_export(&args[1..]),
        "export-set" => cmd_export_set(&args[1..]),
        "--help" | "-h" | "help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

// ── loop mode ─────────────────────────────────────────────────────

fn cmd_loop(args: &[String]) -> anyhow::Result<()> {
    let pattern_file = flag_value(args, "--pattern")
        .map(PathBuf::from)
        .context("loop mode needs --pattern <file.json>")?;
    let bpm = match flag_value(args, "--bpm") {
        Some(raw) => raw.parse().context("--bpm must be a number")?,
        None => DEFAULT_BPM,
    };

    let (handle, _stream) = audio::start_audio()?;
    let mut sampler = LoopingSampler::from_pattern_file(&pattern_file, bpm, Arc::new(handle))?;

    println!("Playing pattern at {bpm} bpm (press any key to stop):\n");
    if let Some(pattern) = sampler.pattern() {
        println!("{pattern}");
    }
    println!("{}", sampler.bank());

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard;

    sampler.clock().start();
    let switch = sampler.clock().switch();
    thread::spawn(move || {
        // first key press ends the loop; the sweep in flight still finishes
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    switch.stop();
                    break;
                }
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    });

    sampler.play_loop()?;
    Ok(())
}

// ── pads mode ─────────────────────────────────────────────────────

fn cmd_pads(args: &[String]) -> anyhow::Result<()> {
    let bank_file = args.first().context("pads mode needs a bank file")?;

    let (handle, _stream) = audio::start_audio()?;
    let doc = loader::load_bank_doc(Path::new(bank_file))?;
    let bank = SampleBank::from_doc(&doc, Arc::new(handle))?;

    println!("octobeat pads");
    println!("=============");
    println!("{bank}");
    println!("1-{}: play channel, q to quit", bank.len().min(9));

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard;

    loop {
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let channel = c as usize - '1' as usize;
                if channel < bank.len() {
                    bank.channel(channel)?.play();
                }
            }
            _ => {}
        }
    }
    Ok(())
}

// ── offline tools ─────────────────────────────────────────────────

fn cmd_init(args: &[String]) -> anyhow::Result<()> {
    let dir = args.first().context("init needs a directory")?;
    let written = BankInitializer::new(Path::new(dir))?
        .force(has_flag(args, "--force"))
        .recursive(has_flag(args, "--recursive"))
        .run()?;
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_export(args: &[String]) -> anyhow::Result<()> {
    let [bank_file, bank_number, out_dir] = args else {
        bail!("export needs <bank.json> <bank-number> <out-dir>");
    };
    let bank_number: usize = bank_number.parse().context("bank number must be a number")?;
    if bank_number < 1 {
        bail!("bank number must be 1 or greater");
    }
    let written = export::export_bank(Path::new(bank_file), bank_number, Path::new(out_dir))?;
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_export_set(args: &[String]) -> anyhow::Result<()> {
    let [in_dir, out_dir] = args else {
        bail!("export-set needs <in-dir> <out-dir>");
    };
    let written = export::export_set(Path::new(in_dir), Path::new(out_dir))?;
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
