//! Persisted sound bank command.

use clap::{Args, Subcommand, ValueEnum};
use tonal_config::{BankKind, SoundBank};

use super::common::{Context, stop_on_ctrlc};

#[derive(Args)]
pub struct BankArgs {
    #[command(subcommand)]
    command: BankCommand,
}

#[derive(Subcommand)]
enum BankCommand {
    /// Load the bank, rendering and saving it if missing or stale
    Warm,

    /// Play one clip from the bank
    Play {
        /// Which table to play from
        #[arg(value_enum)]
        kind: KindArg,

        /// Note name (e.g. A4)
        note: String,
    },

    /// Show the bank location and settings
    Info,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    /// Plain sine clips
    Basic,
    /// Modulated clips
    Organ,
}

impl From<KindArg> for BankKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Basic => BankKind::Basic,
            KindArg::Organ => BankKind::Organ,
        }
    }
}

pub fn run(ctx: &Context, args: BankArgs) -> anyhow::Result<()> {
    let path = ctx.config.bank_path();
    let spec = ctx.config.bank_spec();

    match args.command {
        BankCommand::Warm => {
            let bank = SoundBank::load_or_build(&ctx.engine(), spec, &path)?;
            println!(
                "Bank ready: {} notes x {} tables ({:?})",
                bank.len(),
                BankKind::ALL.len(),
                bank.origin()
            );
            println!("  Path: {}", path.display());
        }
        BankCommand::Play { kind, note } => {
            let kind = BankKind::from(kind);
            let mut bank = SoundBank::load_or_build(&ctx.engine(), spec, &path)?;
            let sound = bank
                .get_mut(kind, &note)
                .ok_or_else(|| anyhow::anyhow!("no {kind} clip for note '{note}'"))?;

            println!("Playing {kind} {note} {sound}...");
            sound.try_play()?;
            stop_on_ctrlc(sound.stop_token())?;
            sound.wait_done();
        }
        BankCommand::Info => {
            println!("Sound Bank");
            println!("==========");
            println!("  Path: {}", path.display());
            println!("  Exists: {}", if path.exists() { "yes" } else { "no" });
            println!("  Duration: {}s", spec.duration_secs);
            println!("  Sample rate: {} Hz", spec.sample_rate);
            println!("  Volume: {}", spec.volume);
            println!("  Fade: {}", spec.fade_fraction);
            println!(
                "  Organ instrument: {} Hz (strength {})",
                spec.organ_instrument_hz, spec.organ_strength
            );
        }
    }
    Ok(())
}
