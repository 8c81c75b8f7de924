//! Render clips to a WAV file.

use std::path::PathBuf;

use clap::Args;
use tonal_io::{SoundSequence, repeat, write_wav};

use super::common::{Clip, Context, MAX_REPEAT, ToneArgs, build_sounds, parse_clip};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Clips as PITCH[:SECS[:VOL]]
    #[arg(value_name = "CLIP", required = true, value_parser = parse_clip)]
    clips: Vec<Clip>,

    /// Repeat the clips this many times
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(0..=MAX_REPEAT))]
    repeat: u64,

    #[command(flatten)]
    tone: ToneArgs,
}

pub fn run(ctx: &Context, args: RenderArgs) -> anyhow::Result<()> {
    let engine = ctx.engine();
    let sounds = build_sounds(ctx, &engine, &args.clips, &args.tone)?;
    let once = SoundSequence::from_sounds(&engine, &sounds, ctx.config.sample_rate)?;
    let seq = repeat(&once, usize::try_from(args.repeat)?)?;

    write_wav(&args.output, seq.buffer())?;
    println!(
        "Wrote {} samples ({:.2}s @ {} Hz) to {}",
        seq.len(),
        seq.buffer().duration_secs(),
        seq.sample_rate(),
        args.output.display()
    );
    Ok(())
}
