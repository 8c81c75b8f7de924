//! Integration tests for tonal-synth.
//!
//! Covers the note table contract, the full render pipeline and the
//! behaviour of cached renders.

use std::sync::Arc;
use tonal_synth::{
    Error, ModulationSpec, PcmBuffer, SynthesisCache, SynthesisParams, apply_envelope, pitch,
    render, synthesize_raw,
};

// ---------------------------------------------------------------------------
// Pitch table
// ---------------------------------------------------------------------------

#[test]
fn reference_frequencies() {
    assert_eq!(pitch::resolve("A4").unwrap(), 440.0);
    assert_eq!(pitch::resolve("Bb4").unwrap(), 466.16);
    assert_eq!(pitch::resolve("A#4").unwrap(), 466.16);
    assert_eq!(pitch::resolve("C4").unwrap(), 261.63);
    assert_eq!(pitch::resolve("G#6").unwrap(), 1661.22);
}

#[test]
fn every_octave_has_seventeen_spellings() {
    for octave in 0..=8u8 {
        let count = pitch::notes().filter(|n| n.octave() == octave).count();
        assert_eq!(count, 17, "octave {octave}");
    }
}

#[test]
fn frequencies_do_not_decrease_in_canonical_order() {
    let freqs: Vec<f64> = pitch::notes().map(|n| n.frequency_hz()).collect();
    assert!(freqs.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn unknown_note_surfaces_immediately() {
    let err = SynthesisParams::for_note("E#4", 1.0).unwrap_err();
    assert_eq!(err, Error::UnknownNote("E#4".to_string()));
}

// ---------------------------------------------------------------------------
// Render pipeline
// ---------------------------------------------------------------------------

#[test]
fn plain_a440_one_second() {
    let raw = synthesize_raw(440.0, 1.0, 8000, None, 1.0).unwrap();
    assert_eq!(raw.len(), 8000);
    assert_eq!(raw[0], 0.0);
}

#[test]
fn render_equals_manual_pipeline() {
    let params = SynthesisParams::for_note("D4", 0.1)
        .unwrap()
        .with_instrument("A4")
        .unwrap()
        .with_modulation_strength(10.0)
        .with_volume(0.5);
    let raw = synthesize_raw(293.66, 0.1, 8000, Some(440.0), 10.0).unwrap();
    let manual = apply_envelope(&raw, 8000, 0.5, 0.01);
    assert_eq!(render(&params).unwrap(), manual);
}

#[test]
fn fade_silences_both_ends() {
    let pcm = render(&SynthesisParams::new(440.0, 0.5).with_volume(1.0)).unwrap();
    assert_eq!(pcm.samples()[0], 0);
    assert_eq!(*pcm.samples().last().unwrap(), 0);
}

#[test]
fn modulated_tone_differs_from_plain() {
    let plain = render(&SynthesisParams::new(440.0, 0.1)).unwrap();
    let organ = render(&SynthesisParams::new(440.0, 0.1).with_modulation(Some(1.0))).unwrap();
    assert_eq!(plain.len(), organ.len());
    assert_ne!(plain, organ);
}

#[test]
fn instrument_spec_variants_agree() {
    let by_name = SynthesisParams::new(300.0, 0.1)
        .with_instrument(ModulationSpec::from("A4"))
        .unwrap();
    let by_hz = SynthesisParams::new(300.0, 0.1)
        .with_instrument(ModulationSpec::NumericHz(440.0))
        .unwrap();
    assert_eq!(render(&by_name).unwrap(), render(&by_hz).unwrap());
}

#[test]
fn other_sample_rates() {
    let params = SynthesisParams::new(440.0, 0.5).with_sample_rate(11025);
    let pcm = render(&params).unwrap();
    assert_eq!(pcm.len(), 5512);
    assert_eq!(pcm.sample_rate(), 11025);
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[test]
fn cached_buffer_can_be_copied_out() {
    let cache = SynthesisCache::new();
    let params = SynthesisParams::for_note("B4", 0.25).unwrap();
    let shared = cache.get_or_create(&params).unwrap();
    let owned: PcmBuffer = (*shared).clone();
    drop(shared);
    let again = cache.get_or_create(&params).unwrap();
    assert_eq!(owned, *again);
    assert_eq!(Arc::strong_count(&again), 2);
}

#[test]
fn table_warm_up() {
    let cache = SynthesisCache::new();
    let table: Vec<SynthesisParams> = pitch::notes()
        .filter(|n| n.octave() == 4)
        .map(|n| SynthesisParams::new(n.frequency_hz(), 0.05))
        .collect();
    // enharmonic spellings share parameters, so only 12 distinct renders
    assert_eq!(cache.warm_up(&table).unwrap(), 12);
    assert_eq!(cache.len(), 12);
}
