//! The interruption daemon and the one-shot quiz command.
//!
//! `run` is the wake loop: arm the next interruption from current settings,
//! sleep until it fires, run a terminal quiz session, repeat. The session
//! itself re-arms at its terminal exit; the loop only steps in when
//! scheduling was declined (inactive day, disabled settings) and retries
//! later, mirroring how a boot-time receiver re-arms after a restart.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use wordgate_core::{
    AudioOutput, Config, InterruptionSession, ScheduleOutcome, Scheduler, SystemPlayer,
    TokioWakeTimer, WordSource, WordStore, INTERRUPTION_SLOT,
};

use crate::common::TerminalSurface;

/// How long to wait before re-checking settings after a declined arm.
const RECHECK_SECS: u64 = 60;

pub fn daemon() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_daemon())
}

pub fn quiz_once() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (timer, _fired) = TokioWakeTimer::new();
        let (session, mut selections) = build_session(timer)?;

        let config = Config::load_or_default();
        let outcome = session.run(&config.schedule, &mut selections).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        Ok(())
    })
}

async fn run_daemon() -> Result<(), Box<dyn std::error::Error>> {
    let (timer, mut fired) = TokioWakeTimer::new();
    let scheduler = Scheduler::new(timer.clone());
    let (session, mut selections) = build_session(timer.clone())?;

    info!("wordgate daemon started");
    loop {
        // Boot-time and post-decline arming: keep checking until a wake
        // signal is pending (settings may change on disk between attempts).
        while !timer.is_armed(INTERRUPTION_SLOT) {
            let config = Config::load_or_default();
            match scheduler.schedule_next(&config.schedule)? {
                ScheduleOutcome::Armed { trigger_at } => {
                    info!(%trigger_at, "next interruption armed");
                }
                outcome => {
                    info!(?outcome, "scheduling declined, retrying in {RECHECK_SECS}s");
                    tokio::time::sleep(Duration::from_secs(RECHECK_SECS)).await;
                }
            }
        }

        if fired.recv().await.is_none() {
            break;
        }

        let config = Config::load_or_default();
        let outcome = session.run(&config.schedule, &mut selections).await;
        info!(?outcome, "interruption session ended");

        if selections.is_closed() {
            info!("input closed, shutting down");
            break;
        }
    }
    Ok(())
}

type SessionParts = (InterruptionSession, mpsc::UnboundedReceiver<String>);

fn build_session(timer: Arc<TokioWakeTimer>) -> Result<SessionParts, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let words: Arc<dyn WordSource> = Arc::new(Mutex::new(WordStore::open()?));
    let audio: Arc<dyn AudioOutput> = Arc::new(SystemPlayer::from_config(&config.audio));
    let surface = Arc::new(TerminalSurface::new());

    let (selections_tx, selections_rx) = mpsc::unbounded_channel();
    spawn_input_task(surface.clone(), selections_tx);

    let session = InterruptionSession::new(words, audio, surface, Scheduler::new(timer));
    Ok((session, selections_rx))
}

/// Forward stdin lines as option selections. EOF closes the channel, which
/// tears down any live session.
fn spawn_input_task(surface: Arc<TerminalSurface>, tx: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if let Some(option) = surface.option_text(&line) {
                        if tx.send(option).is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });
}
