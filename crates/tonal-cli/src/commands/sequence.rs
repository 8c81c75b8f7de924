//! Clip sequence playback command.

use clap::Args;
use tonal_io::{SoundSequence, repeat};

use super::common::{Clip, Context, MAX_REPEAT, ToneArgs, build_sounds, parse_clip, stop_on_ctrlc};

#[derive(Args)]
pub struct SequenceArgs {
    /// Clips as PITCH[:SECS[:VOL]], e.g. D3:1 A3:1:0.3 E3
    #[arg(value_name = "CLIP", required = true, value_parser = parse_clip)]
    clips: Vec<Clip>,

    /// Play the whole sequence this many times
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(0..=MAX_REPEAT))]
    repeat: u64,

    #[command(flatten)]
    tone: ToneArgs,
}

pub fn run(ctx: &Context, args: SequenceArgs) -> anyhow::Result<()> {
    let engine = ctx.engine();
    let sounds = build_sounds(ctx, &engine, &args.clips, &args.tone)?;
    let once = SoundSequence::from_sounds(&engine, &sounds, ctx.config.sample_rate)?;
    let mut seq = repeat(&once, usize::try_from(args.repeat)?)?;

    if seq.is_empty() {
        println!("Nothing to play.");
        return Ok(());
    }

    println!(
        "Playing {} clip(s), {:.2}s... Press Ctrl+C to stop.",
        seq.sounds().len(),
        seq.duration_secs()
    );
    for sound in seq.sounds().iter().take(sounds.len()) {
        println!("  {sound}");
    }

    seq.try_play()?;
    stop_on_ctrlc(seq.stop_token())?;
    seq.wait_done();
    Ok(())
}
