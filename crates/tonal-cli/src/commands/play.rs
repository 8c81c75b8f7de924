//! Single tone playback command.

use clap::Args;
use tonal_io::Sound;

use super::common::{Context, ToneArgs, parse_pitch, stop_on_ctrlc};

#[derive(Args)]
pub struct PlayArgs {
    /// Note name (e.g. A4, Bb3) or frequency in Hz
    #[arg(value_name = "PITCH")]
    pitch: String,

    /// Duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Volume (0-1)
    #[arg(long)]
    volume: Option<f64>,

    #[command(flatten)]
    tone: ToneArgs,
}

pub fn run(ctx: &Context, args: PlayArgs) -> anyhow::Result<()> {
    let engine = ctx.engine();
    let mut params = args.tone.apply(ctx.params_for(&parse_pitch(&args.pitch))?)?;
    if let Some(duration) = args.duration {
        params.duration_secs = duration;
    }
    if let Some(volume) = args.volume {
        params.volume = volume;
    }

    let mut sound = Sound::new(&engine, params)?;
    println!("Playing {sound}... Press Ctrl+C to stop.");

    sound.try_play()?;
    stop_on_ctrlc(sound.stop_token())?;
    sound.wait_done();
    Ok(())
}
