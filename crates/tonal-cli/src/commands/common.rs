//! Shared CLI helpers used across multiple commands.

use std::path::Path;
use std::sync::Arc;

use tonal_config::AppConfig;
use tonal_io::{CpalBackend, PlaybackDevice, SimulatedBackend, Sound, SoundEngine, StopToken};
use tonal_synth::{ModulationSpec, Pitch, SynthesisParams};

/// Largest accepted `--repeat` count.
pub const MAX_REPEAT: u64 = 10_000;

/// Clock speed of the `--dry-run` device relative to real time.
const DRY_RUN_SPEED: f64 = 10.0;

/// Loaded settings plus the playback target chosen on the command line.
pub struct Context {
    pub config: AppConfig,
    pub dry_run: bool,
}

impl Context {
    /// Load the config from `path` or the default location.
    pub fn load(path: Option<&Path>, dry_run: bool) -> anyhow::Result<Self> {
        let config = AppConfig::load_or_default(path)?;
        Ok(Self { config, dry_run })
    }

    /// A sound engine for the selected device.
    pub fn engine(&self) -> SoundEngine {
        let device: Arc<dyn PlaybackDevice> = if self.dry_run {
            Arc::new(SimulatedBackend::new().with_speed(DRY_RUN_SPEED))
        } else {
            match &self.config.output_device {
                Some(name) => Arc::new(CpalBackend::with_device(name.clone())),
                None => Arc::new(CpalBackend::new()),
            }
        };
        SoundEngine::new(device)
    }

    /// Configured parameters for a tone at `pitch`.
    pub fn params_for(&self, pitch: &Pitch) -> anyhow::Result<SynthesisParams> {
        Ok(self.config.base_params(pitch.resolve()?))
    }
}

/// A note name or a frequency in Hz.
pub fn parse_pitch(s: &str) -> Pitch {
    match s.parse::<f64>() {
        Ok(hz) => Pitch::Hz(hz),
        Err(_) => Pitch::Note(s.to_string()),
    }
}

/// `none`, a note name, or a frequency in Hz.
pub fn parse_instrument(s: &str) -> ModulationSpec {
    if s.eq_ignore_ascii_case("none") {
        return ModulationSpec::None;
    }
    match s.parse::<f64>() {
        Ok(hz) => ModulationSpec::NumericHz(hz),
        Err(_) => ModulationSpec::NoteName(s.to_string()),
    }
}

fn instrument_arg(s: &str) -> Result<ModulationSpec, String> {
    Ok(parse_instrument(s))
}

/// One `PITCH[:SECS[:VOL]]` clip from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub pitch: Pitch,
    pub duration: Option<f64>,
    pub volume: Option<f64>,
}

/// Parse `PITCH[:SECS[:VOL]]`.
pub fn parse_clip(s: &str) -> Result<Clip, String> {
    let mut parts = s.split(':');
    let pitch = match parts.next() {
        Some(p) if !p.is_empty() => parse_pitch(p),
        _ => return Err(format!("empty clip '{s}' (expected PITCH[:SECS[:VOL]])")),
    };
    let number = |field: Option<&str>, what: &str| -> Result<Option<f64>, String> {
        field
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| format!("invalid {what} '{v}' in clip '{s}'"))
            })
            .transpose()
    };
    let duration = number(parts.next(), "duration")?;
    let volume = number(parts.next(), "volume")?;
    if parts.next().is_some() {
        return Err(format!(
            "too many fields in clip '{s}' (expected PITCH[:SECS[:VOL]])"
        ));
    }
    Ok(Clip {
        pitch,
        duration,
        volume,
    })
}

/// Instrument settings shared by every clip of a command.
#[derive(Debug, Clone, clap::Args)]
pub struct ToneArgs {
    /// Modulating instrument: none, a note name, or Hz
    #[arg(short, long, value_parser = instrument_arg)]
    pub instrument: Option<ModulationSpec>,

    /// Modulation strength
    #[arg(short, long)]
    pub strength: Option<f64>,

    /// Fade ramp length as a fraction of a second
    #[arg(long)]
    pub fade: Option<f64>,
}

impl ToneArgs {
    /// Apply the overrides to `params`.
    pub fn apply(&self, mut params: SynthesisParams) -> anyhow::Result<SynthesisParams> {
        if let Some(instrument) = &self.instrument {
            params = params.with_instrument(instrument.clone())?;
        }
        if let Some(strength) = self.strength {
            params = params.with_modulation_strength(strength);
        }
        if let Some(fade) = self.fade {
            params = params.with_fade_fraction(fade);
        }
        Ok(params)
    }
}

/// Render each clip with the config defaults and `tone` overrides.
pub fn build_sounds(
    ctx: &Context,
    engine: &SoundEngine,
    clips: &[Clip],
    tone: &ToneArgs,
) -> anyhow::Result<Vec<Sound>> {
    clips
        .iter()
        .map(|clip| {
            let mut params = tone.apply(ctx.params_for(&clip.pitch)?)?;
            if let Some(duration) = clip.duration {
                params.duration_secs = duration;
            }
            if let Some(volume) = clip.volume {
                params.volume = volume;
            }
            Ok(Sound::new(engine, params)?)
        })
        .collect()
}

/// Route Ctrl+C to `token` so a blocking wait returns early.
pub fn stop_on_ctrlc(token: Option<StopToken>) -> anyhow::Result<()> {
    if let Some(token) = token {
        ctrlc::set_handler(move || {
            println!("\nStopping...");
            token.stop();
        })?;
    }
    Ok(())
}
