use std::path::PathBuf;

use clap::Parser;
use holistic_overlay::types::Viewport;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory of png/jpeg frames, played in file name order
    #[arg(long)]
    pub frames: PathBuf,

    /// Recorded detection results, one JSON object per line
    #[arg(long)]
    pub results: PathBuf,

    /// Start the recorded results over when they run out
    #[arg(long, default_value_t = false)]
    pub loop_results: bool,

    /// Output directory for rendered frames (overrides the config)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Host viewport as WIDTHxHEIGHT (overrides the config)
    #[arg(long, value_parser = parse_viewport)]
    pub viewport: Option<Viewport>,

    /// Print each frame's draw calls instead of writing images
    #[arg(long)]
    pub trace: bool,
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let width = width
        .trim()
        .parse()
        .map_err(|err| format!("bad viewport width {width:?}: {err}"))?;
    let height = height
        .trim()
        .parse()
        .map_err(|err| format!("bad viewport height {height:?}: {err}"))?;
    Ok(Viewport::new(width, height))
}
