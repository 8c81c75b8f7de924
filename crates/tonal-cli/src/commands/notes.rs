//! Note table listing command.

use clap::Args;
use tonal_synth::pitch;

#[derive(Args)]
pub struct NotesArgs {
    /// Only list one octave (0-8)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=8))]
    octave: Option<u8>,
}

pub fn run(args: NotesArgs) -> anyhow::Result<()> {
    let notes: Vec<_> = pitch::notes()
        .filter(|n| args.octave.is_none_or(|o| n.octave() == o))
        .collect();

    println!("{:<6} {:>10}", "Note", "Hz");
    for note in &notes {
        println!("{:<6} {:>10.2}", note.name(), note.frequency_hz());
    }
    println!("\n{} note(s)", notes.len());
    Ok(())
}
