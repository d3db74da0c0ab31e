//! Shared CLI glue: access-code gating, prompts, the recording flow, and the
//! terminal rendition of the quiz surface.

use std::error::Error;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use wordgate_core::audio::{clip_path_for, is_valid_clip, Recorder, SystemCapture};
use wordgate_core::error::SurfaceError;
use wordgate_core::{Config, Surface};

/// Gate a parent-only operation behind the access code.
///
/// Reads WORDGATE_PIN when set (for scripting); otherwise prompts.
pub fn require_pin(config: &Config) -> Result<(), Box<dyn Error>> {
    let entered = match std::env::var("WORDGATE_PIN") {
        Ok(pin) => pin,
        Err(_) => prompt("Parent access code: ")?,
    };
    if config.verify_pin(entered.trim()) {
        Ok(())
    } else {
        Err("incorrect access code".into())
    }
}

pub fn prompt(label: &str) -> Result<String, Box<dyn Error>> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Record a clip for `text` interactively via the configured recorder.
pub fn record_clip(config: &Config, text: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = clip_path_for(text)?;
    let mut recorder = Recorder::new(Box::new(SystemCapture::from_config(&config.audio)));
    recorder.start(path)?;
    prompt("Recording... press Enter to stop.")?;
    let saved = recorder.stop()?;
    println!("Recording saved: {}", saved.display());
    Ok(saved)
}

/// Produce the clip for a word being added or edited: either record one now
/// or import an existing file into the clips directory.
pub fn resolve_clip(
    config: &Config,
    text: &str,
    audio: Option<PathBuf>,
    record: bool,
) -> Result<PathBuf, Box<dyn Error>> {
    if record {
        return record_clip(config, text);
    }
    let Some(source) = audio else {
        return Err("provide --audio <file> or --record".into());
    };
    if !is_valid_clip(&source) {
        return Err(format!("audio file missing or empty: {}", source.display()).into());
    }
    // Import into the clips directory so wordgate owns the file lifecycle.
    let mut dest = clip_path_for(text)?;
    if let Some(ext) = source.extension() {
        dest.set_extension(ext);
    }
    std::fs::copy(&source, &dest)?;
    Ok(dest)
}

/// The quiz surface rendered as terminal output. Selections arrive as option
/// numbers (or the word itself) on stdin.
pub struct TerminalSurface {
    options: Mutex<Vec<String>>,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            options: Mutex::new(Vec::new()),
        }
    }

    /// Translate an input line into the option text it names, if any.
    pub fn option_text(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let options = self.options.lock().ok()?;
        if let Ok(n) = line.parse::<usize>() {
            if (1..=options.len()).contains(&n) {
                return Some(options[n - 1].clone());
            }
        }
        options.iter().find(|o| o.eq_ignore_ascii_case(line)).cloned()
    }

    fn print_options(&self, options: &[String]) {
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        print!("> ");
        let _ = std::io::stdout().flush();
    }
}

impl Surface for TerminalSurface {
    fn attach(&self) -> Result<(), SurfaceError> {
        println!();
        println!("======  WORD QUIZ  ======");
        Ok(())
    }

    fn detach(&self) {
        println!("=========================");
        println!();
    }

    fn show_round(&self, options: &[String]) {
        if let Ok(mut slot) = self.options.lock() {
            *slot = options.to_vec();
        }
        println!("Listen and choose the word you heard:");
        self.print_options(options);
    }

    fn show_verdict(&self, option: &str, correct: bool) {
        println!();
        println!("  {} {option}", if correct { "correct:" } else { "wrong:" });
    }

    fn clear_verdict(&self) {
        println!("Pick again:");
        if let Ok(options) = self.options.lock() {
            self.print_options(&options);
        }
    }

    fn show_message(&self, message: &str) {
        println!("{message}");
    }
}
