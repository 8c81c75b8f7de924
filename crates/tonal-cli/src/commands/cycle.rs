//! Demo sweeps over instruments, pitches and modulation strengths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Args, ValueEnum};
use tonal_io::Sound;
use tonal_synth::{SynthesisParams, pitch};

use super::common::Context;

const CLIP_SECS: f64 = 0.1;
const CLIP_VOLUME: f64 = 0.5;
const SWEEP_STRENGTH: f64 = 10.0;

#[derive(Args)]
pub struct CycleArgs {
    /// What to sweep
    #[arg(value_enum, default_value_t = Sweep::Instruments)]
    sweep: Sweep,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Sweep {
    /// D4 under a range of modulating instruments
    #[default]
    Instruments,
    /// A range of pitches under an A4 instrument
    Pitches,
    /// A4 under an A4 instrument with rising strength
    Strength,
}

/// Parameters for each clip of `sweep`, in play order.
fn sweep_params(sweep: Sweep, sample_rate: u32) -> anyhow::Result<Vec<SynthesisParams>> {
    let names = pitch::ordered_names();
    let base = |note: &str| -> anyhow::Result<SynthesisParams> {
        Ok(SynthesisParams::for_note(note, CLIP_SECS)?.with_sample_rate(sample_rate))
    };

    let params = match sweep {
        Sweep::Instruments => names[80..100]
            .iter()
            .map(|&instrument| -> anyhow::Result<SynthesisParams> {
                Ok(base("D4")?
                    .with_instrument(instrument)?
                    .with_modulation_strength(SWEEP_STRENGTH))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
        Sweep::Pitches => names[70..90]
            .iter()
            .map(|&note| -> anyhow::Result<SynthesisParams> {
                Ok(base(note)?
                    .with_volume(CLIP_VOLUME)
                    .with_instrument("A4")?
                    .with_modulation_strength(SWEEP_STRENGTH))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
        Sweep::Strength => (0..200)
            .step_by(10)
            .map(|k| -> anyhow::Result<SynthesisParams> {
                Ok(base("A4")?
                    .with_volume(CLIP_VOLUME)
                    .with_instrument("A4")?
                    .with_modulation_strength(f64::from(k)))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
    };
    Ok(params)
}

pub fn run(ctx: &Context, args: CycleArgs) -> anyhow::Result<()> {
    let engine = ctx.engine();
    let clips = sweep_params(args.sweep, ctx.config.sample_rate)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        println!("\nStopping...");
    })?;

    println!("Cycling {} clip(s)... Press Ctrl+C to stop.", clips.len());
    for params in clips {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let mut sound = Sound::new(&engine, params)?;
        println!("  {sound}");
        sound.try_play()?;
        sound.wait_done();
    }
    Ok(())
}
