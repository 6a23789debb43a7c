use clap::Parser;
use crossterm::{
    cursor::{Hide, Show as ShowCursor},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use std::cell::RefCell;
use std::io::{self, BufWriter, Stdout, stdout};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use termworks::canvas::Canvas;
use termworks::config::{Preset, ShowConfig};
use termworks::logging;
use termworks::scheduler::Scheduler;
use termworks::show::Show;
use termworks::surface::TerminalCanvas;
use termworks::{Error, Result};

/// Host refresh period; the scheduler decides which refreshes become frames.
const REFRESH_INTERVAL: Duration = Duration::from_millis(4);
const TRAIL_FADE: f32 = 0.15;

#[derive(Parser, Debug)]
#[command(
    name = "termworks",
    version,
    about = "Fireworks show for the terminal",
    after_help = "Press 'q', ESC, or Ctrl+C to exit"
)]
struct Cli {
    /// Built-in tuning
    #[arg(short, long, value_enum, default_value_t = Preset::Classic)]
    preset: Preset,

    /// TOML tuning file; keys it omits keep the classic values. Overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame rate cap; 0 renders on every refresh
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Background color as hex (e.g. 1a1b26)
    #[arg(long, value_parser = parse_hex_color)]
    bg_color: Option<(u8, u8, u8)>,

    /// Seed for a reproducible show
    #[arg(long)]
    seed: Option<u64>,

    /// Print the current frame rate in the top-left corner
    #[arg(long)]
    show_fps: bool,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log verbosity: off, error, warn, info, debug or trace
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn parse_hex_color(hex: &str) -> Result<(u8, u8, u8)> {
    let digits = hex.trim_start_matches('#');
    let invalid = || Error::InvalidColor(hex.to_string());
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| invalid());
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Everything the frame callback mutates.
struct Stage<'o> {
    show: Show,
    canvas: TerminalCanvas,
    rng: fastrand::Rng,
    out: &'o mut BufWriter<Stdout>,
    world_height: f32,
    background: (u8, u8, u8),
    fps: Option<u32>,
    failure: Option<io::Error>,
}

impl Stage<'_> {
    fn frame(&mut self, dt: f64) -> ControlFlow<()> {
        self.canvas.fade(TRAIL_FADE);
        self.show.tick(dt, &mut self.canvas, &mut self.rng);

        let overlay = self.fps.map(|fps| format!("{fps:>3} fps"));
        if let Err(err) = self.canvas.present(self.out, overlay.as_deref()) {
            self.failure = Some(err);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> io::Result<()> {
        self.canvas = TerminalCanvas::new(cols as usize, rows as usize, self.world_height, self.background);
        self.show.resize(self.canvas.viewport());
        execute!(self.out, Clear(ClearType::All))
    }
}

fn is_exit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn drive(config: ShowConfig, cli: &Cli, out: &mut BufWriter<Stdout>) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let background = cli.bg_color.unwrap_or((0, 0, 0));
    let world_height = config.world_height;
    let canvas = TerminalCanvas::new(cols as usize, rows as usize, world_height, background);
    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let show = Show::new(config, canvas.viewport(), &mut rng);

    let stage = RefCell::new(Stage {
        show,
        canvas,
        rng,
        out,
        world_height,
        background,
        fps: cli.show_fps.then_some(0),
        failure: None,
    });
    let limit_ms = cli.duration.map(|seconds| seconds * 1000.0);
    // Delivered deltas add up to wall time; the scheduler's total does not under a cap.
    let mut played_ms = 0.0;

    let mut scheduler = Scheduler::new(
        |dt, _| {
            played_ms += dt;
            if limit_ms.is_some_and(|limit| played_ms >= limit) {
                return ControlFlow::Break(());
            }
            stage.borrow_mut().frame(dt)
        },
        cli.fps,
    );
    scheduler.start();
    log::info!("show started on a {cols}x{rows} terminal, fps cap {}", cli.fps);

    while scheduler.has_pending_frame() {
        if event::poll(REFRESH_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if is_exit(&key) => {
                    scheduler.stop();
                }
                Event::Resize(cols, rows) => {
                    log::debug!("resized to {cols}x{rows}");
                    stage.borrow_mut().resize(cols, rows)?;
                }
                _ => {}
            }
        }

        scheduler.run_frame();
        if cli.show_fps {
            stage.borrow_mut().fps = Some(scheduler.fps());
        }
    }

    drop(scheduler);
    log::info!("show stopped after {:.1}s", played_ms / 1000.0);
    match stage.into_inner().failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn run_show(config: ShowConfig, cli: &Cli) -> Result<()> {
    let mut out = BufWriter::with_capacity(1024 * 64, stdout());

    terminal::enable_raw_mode()?;
    let entered = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture);
    let result = match entered {
        Ok(()) => drive(config, cli, &mut out),
        Err(err) => Err(err.into()),
    };

    let screen = execute!(out, ShowCursor, LeaveAlternateScreen, DisableMouseCapture);
    let raw = terminal::disable_raw_mode();
    first_failure(result, [screen, raw])
}

/// Reports the show's own error ahead of any teardown error.
fn first_failure(result: Result<()>, teardown: [io::Result<()>; 2]) -> Result<()> {
    result?;
    for step in teardown {
        step?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_file.as_deref(), cli.log_level)?;

    let config = match &cli.config {
        Some(path) => ShowConfig::load(path)?,
        None => cli.preset.config(),
    };
    log::info!("tuning: {config:?}");

    run_show(config, &cli)
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("termworks: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("1a1b26").unwrap(), (0x1a, 0x1b, 0x26));
        assert_eq!(parse_hex_color("#FFffFF").unwrap(), (255, 255, 255));
        assert!(matches!(parse_hex_color("12345"), Err(Error::InvalidColor(_))));
        assert!(matches!(parse_hex_color("zz0000"), Err(Error::InvalidColor(_))));
        assert!(matches!(parse_hex_color("é12345"), Err(Error::InvalidColor(_))));
        assert!(matches!(parse_hex_color("+1+2+3"), Err(Error::InvalidColor(_))));
        assert!(matches!(parse_hex_color("#-1a1b2"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_first_failure_prefers_show_error() {
        let broken = || Err(io::Error::other("tty gone"));

        assert!(first_failure(Ok(()), [Ok(()), Ok(())]).is_ok());
        assert!(matches!(first_failure(Ok(()), [Ok(()), broken()]), Err(Error::Io(_))));

        let shown = Err(Error::InvalidColor("zz".into()));
        assert!(matches!(
            first_failure(shown, [broken(), broken()]),
            Err(Error::InvalidColor(_))
        ));
    }

    #[test]
    fn test_cli_defaults_and_flags() {
        let cli = Cli::try_parse_from(["termworks"]).unwrap();
        assert_eq!(cli.preset, Preset::Classic);
        assert_eq!(cli.fps, 60.0);
        assert!(cli.bg_color.is_none());

        let cli = Cli::try_parse_from([
            "termworks",
            "--preset",
            "confetti",
            "--fps",
            "0",
            "--bg-color",
            "1a1b26",
            "--seed",
            "9",
            "--duration",
            "2.5",
        ])
        .unwrap();
        assert_eq!(cli.preset, Preset::Confetti);
        assert_eq!(cli.fps, 0.0);
        assert_eq!(cli.bg_color, Some((0x1a, 0x1b, 0x26)));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.duration, Some(2.5));

        assert!(Cli::try_parse_from(["termworks", "--bg-color", "nope"]).is_err());
        assert!(Cli::try_parse_from(["termworks", "--preset", "sparkler"]).is_err());
    }
}
