//! Command-line front end: render one page of a document to PNG and
//! optionally dump its extracted text.

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use docview::viewer::{
    DesktopHost, ErrorKind, ImageData, MupdfEngine, RenderSession, SessionConfig, SessionEvents,
    Surface,
};

const ENGINE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "docview", version, about = "Render a PDF page to PNG and extract its text")]
struct Args {
    /// Document to open
    document: PathBuf,

    /// Page to render (1-indexed, clamped to the document)
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Zoom scale factor (clamped to the configured range)
    #[arg(short, long, default_value_t = 1.0)]
    scale: f32,

    /// Output PNG path (defaults to <document>-p<page>.png)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print extracted text to stdout
    #[arg(short, long)]
    text: bool,

    /// Optional YAML session config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Surface that writes each painted page to a PNG file
struct PngSurface {
    path: PathBuf,
    error: Rc<RefCell<Option<String>>>,
}

impl Surface for PngSurface {
    fn prepare(&mut self, _width_px: u32, _height_px: u32) {}

    fn paint(&mut self, image: &ImageData) {
        if let Err(e) = write_png(&self.path, image) {
            *self.error.borrow_mut() = Some(e.to_string());
        }
    }

    fn clear(&mut self) {}
}

/// Notifier that logs progress and records the last error
struct CliEvents {
    error: Rc<RefCell<Option<String>>>,
}

impl SessionEvents for CliEvents {
    fn on_page_changed(&mut self, page: u32, page_count: u32) {
        info!("page {page}/{page_count}");
    }

    fn on_zoom_changed(&mut self, scale: f32) {
        info!("zoom {:.0}%", scale * 100.0);
    }

    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        *self.error.borrow_mut() = Some(format!("{kind:?}: {message}"));
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let config = match &args.config {
        Some(path) => SessionConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(&args.document, args.page));

    let surface_error = Rc::new(RefCell::new(None));
    let session_error = Rc::new(RefCell::new(None));

    let engine = MupdfEngine::new(config.cache_pages);
    let mut session = RenderSession::new(
        &config,
        Box::new(engine.handle()),
        Box::new(PngSurface {
            path: out_path.clone(),
            error: Rc::clone(&surface_error),
        }),
        Box::new(CliEvents {
            error: Rc::clone(&session_error),
        }),
        Box::new(DesktopHost::new()),
    );

    session.open(&args.document.to_string_lossy());
    pump(&mut session, &engine)?;
    check(&session_error)?;

    if args.page != session.current_page() {
        session.go_to_page(args.page);
        pump(&mut session, &engine)?;
        check(&session_error)?;
    }

    if (args.scale - session.scale()).abs() > f32::EPSILON {
        session.set_zoom(args.scale);
        pump(&mut session, &engine)?;
        check(&session_error)?;
    }

    if let Some(e) = surface_error.borrow().as_deref() {
        bail!("failed to write {}: {e}", out_path.display());
    }

    if args.text {
        println!("{}", session.extracted_text());
    }

    info!(
        "rendered page {}/{} at {:.2}x -> {}",
        session.current_page(),
        session.page_count(),
        session.scale(),
        out_path.display()
    );

    Ok(())
}

/// Block on engine responses until the session settles
fn pump(session: &mut RenderSession, engine: &MupdfEngine) -> Result<()> {
    while session.is_busy() {
        match engine.recv_timeout(ENGINE_TIMEOUT) {
            Some(response) => session.handle_response(response),
            None => bail!("render engine did not respond within {ENGINE_TIMEOUT:?}"),
        }
    }
    Ok(())
}

fn check(error: &Rc<RefCell<Option<String>>>) -> Result<()> {
    match error.borrow_mut().take() {
        Some(message) => bail!("{message}"),
        None => Ok(()),
    }
}

fn default_out_path(document: &Path, page: u32) -> PathBuf {
    let stem = document
        .file_stem()
        .map_or_else(|| "page".to_string(), |s| s.to_string_lossy().into_owned());
    PathBuf::from(format!("{stem}-p{page}.png"))
}

fn write_png(path: &Path, image: &ImageData) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width_px, image.height_px);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.pixels)?;
    Ok(())
}
