//! Inclusive Play entry point
//!
//! Native: a line-oriented driver that feeds typed commands into a session
//! and prints speech, vibration and toasts to the console.
//! Web: logging setup only; the page drives `WebSession`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
mod native_game {
    use std::io::{BufRead, Write};
    use std::path::PathBuf;
    use std::time::Instant;

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use inclusive_play::input::KeyPress;
    use inclusive_play::platform::GameHost;
    use inclusive_play::platform::native::console_presenter;
    use inclusive_play::{
        AccessibilitySettings, InputEvent, RecognitionError, Session, SettingsOwner,
    };

    /// Accessible shape and color matching game (console driver)
    #[derive(Debug, Parser)]
    #[command(name = "inclusive-play", author, version, about)]
    pub struct Args {
        /// RNG seed; random when omitted
        #[arg(long)]
        pub seed: Option<u64>,

        /// Settings JSON file (same keys as the web settings panel)
        #[arg(long, value_name = "FILE")]
        pub settings: Option<PathBuf>,

        /// Verbose announcements and slower speech
        #[arg(long, default_value_t = false)]
        pub screen_reader: bool,

        /// Longer celebration before the next round
        #[arg(long, default_value_t = false)]
        pub extended_timeout: bool,

        /// Advance to the next round after this many seconds (3-30)
        #[arg(long, value_name = "SECS")]
        pub auto_advance: Option<u32>,

        /// Enable single-switch scanning (space/enter is the switch)
        #[arg(long, default_value_t = false)]
        pub switch_input: bool,

        /// Do not print vibration feedback
        #[arg(long, default_value_t = false)]
        pub no_vibration: bool,
    }

    impl Args {
        fn load_settings(&self) -> Result<AccessibilitySettings> {
            let mut settings = match &self.settings {
                Some(path) => {
                    let json = std::fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    AccessibilitySettings::from_json(&json)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => AccessibilitySettings::default(),
            };
            // Flags only ever switch things on
            settings.screen_reader_mode |= self.screen_reader;
            settings.extended_timeout |= self.extended_timeout;
            settings.switch_input |= self.switch_input;
            if self.no_vibration {
                settings.vibration = false;
            }
            if let Some(secs) = self.auto_advance {
                settings.auto_advance = true;
                settings.auto_advance_time = secs;
            }
            Ok(settings.sanitized())
        }
    }

    const HELP: &str = "\
commands:
  click <n>          select option n
  key <chord>        keypress, e.g. 3, r, h, space, ctrl+n, ctrl+up, esc
  say <text>         voice transcript, e.g. 'say select 2'
  mic <code>         speech recognition error, e.g. 'mic not-allowed'
  switch             press the external switch
  pad <slot> <bits>  gamepad poll, e.g. 'pad 0 0100'
  unplug <slot>      gamepad disconnected
  wait <ms>          let time pass
  status             print the render snapshot as JSON
  restart            new game
  quit";

    struct Driver {
        host: GameHost,
        started: Instant,
        /// Extra time added by `wait`
        skipped_ms: u64,
        shown_generation: u64,
    }

    impl Driver {
        fn now_ms(&self) -> u64 {
            self.started.elapsed().as_millis() as u64 + self.skipped_ms
        }

        /// Print the options whenever a new round is showing
        fn show_round(&mut self) {
            let session = self.host.session();
            if session.generation() != self.shown_generation {
                self.shown_generation = session.generation();
                print_round(session);
            }
        }

        fn catch_up(&mut self) {
            let now = self.now_ms();
            self.host.advance(now);
            self.show_round();
        }

        /// Run one command line; returns false on quit
        fn command(&mut self, line: &str) -> Result<bool> {
            let (cmd, rest) = line
                .trim()
                .split_once(' ')
                .map(|(c, r)| (c, r.trim()))
                .unwrap_or((line.trim(), ""));

            let event = match cmd {
                "" => return Ok(true),
                "quit" | "exit" => return Ok(false),
                "help" | "?" => {
                    println!("{HELP}");
                    return Ok(true);
                }
                "status" => {
                    println!("{}", serde_json::to_string_pretty(&self.host.snapshot())?);
                    return Ok(true);
                }
                "restart" => {
                    self.host.restart(rand::random());
                    self.show_round();
                    return Ok(true);
                }
                "wait" => {
                    let ms: u64 = rest.parse().context("wait takes milliseconds")?;
                    self.skipped_ms += ms;
                    return Ok(true);
                }
                "click" => {
                    let n: usize = rest.parse().context("click takes an option number")?;
                    let Some(index) = n.checked_sub(1) else {
                        bail!("options are numbered from 1");
                    };
                    InputEvent::Pointer(index)
                }
                "key" => match KeyPress::parse_chord(rest) {
                    Some(press) => InputEvent::Key(press),
                    None => bail!("unknown key {rest:?}"),
                },
                "say" => InputEvent::Transcript(rest.to_string()),
                "mic" => InputEvent::RecognitionError(RecognitionError::from_code(rest)),
                "switch" => InputEvent::SwitchPress,
                "pad" => {
                    let (slot, bits) = rest.split_once(' ').context("pad takes <slot> <bits>")?;
                    let slot: usize = slot.parse().context("bad gamepad slot")?;
                    let buttons = bits.trim().chars().map(|c| c == '1').collect();
                    InputEvent::GamepadPoll { slot, buttons }
                }
                "unplug" => {
                    let slot: usize = rest.parse().context("unplug takes a gamepad slot")?;
                    InputEvent::GamepadDisconnected(slot)
                }
                other => bail!("unknown command {other:?} (try 'help')"),
            };
            self.host.handle(event);
            self.show_round();
            Ok(true)
        }
    }

    fn print_round(session: &Session) {
        let state = session.state();
        println!(
            "\n== Round {} | level {} | score {} | streak {} ==",
            session.generation(),
            state.level,
            state.score,
            state.streak
        );
        for (i, piece) in session.round().options.iter().enumerate() {
            println!("  {}. {}", i + 1, piece);
        }
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();
        let settings = args.load_settings()?;
        let seed = args.seed.unwrap_or_else(rand::random);
        log::info!("Inclusive Play (native) starting, seed {}", seed);

        let presenter = console_presenter(settings.vibration);
        let host = GameHost::new(seed, SettingsOwner::new(settings), presenter, 0);
        let mut driver = Driver {
            host,
            started: Instant::now(),
            skipped_ms: 0,
            shown_generation: 0,
        };
        driver.show_round();
        println!("Type 'help' for commands.");

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next() else { break };
            let line = line?;
            // Timers that came due while waiting for input fire first
            driver.catch_up();
            match driver.command(&line) {
                Ok(true) => driver.catch_up(),
                Ok(false) => break,
                Err(e) => println!("error: {e:#}"),
            }
        }

        let state = driver.host.session().state();
        println!(
            "Final score {} (level {}, {} correct, {} incorrect)",
            state.score, state.level, state.total_correct, state.total_incorrect
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn driver() -> Driver {
            let owner = SettingsOwner::default();
            let host = GameHost::new(5, owner, console_presenter(false), 0);
            Driver {
                host,
                started: Instant::now(),
                skipped_ms: 0,
                shown_generation: 1,
            }
        }

        fn answered(driver: &Driver) -> u32 {
            let state = driver.host.session().state();
            state.total_correct + state.total_incorrect
        }

        #[test]
        fn test_click_zero_is_rejected() {
            let mut driver = driver();
            assert!(driver.command("click 0").is_err());
            assert_eq!(answered(&driver), 0);
            assert!(driver.command("click 1").unwrap());
            assert_eq!(answered(&driver), 1);
        }

        #[test]
        fn test_unplug_and_quit() {
            let mut driver = driver();
            assert!(driver.command("unplug 0").unwrap());
            assert!(driver.command("unplug").is_err());
            assert!(!driver.command("quit").unwrap());
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    inclusive_play::platform::web::init_logging();
    log::info!("Inclusive Play starting...");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
