//! Property-based tests for tonal-synth.
//!
//! Checks output length, peak normalization, envelope symmetry and cache
//! determinism over randomized parameters.

use proptest::prelude::*;
use tonal_synth::envelope::{envelope_curve, fade_samples};
use tonal_synth::{SynthesisCache, SynthesisParams, render, synthesize_raw};

fn sample_rates() -> impl Strategy<Value = u32> {
    prop::sample::select(vec![4000u32, 8000, 11025, 22050])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Output length is floor(duration * rate) and the peak is exactly 1.
    #[test]
    fn raw_length_and_peak(
        freq in 20.0f64..4000.0,
        duration in 0.01f64..0.5,
        rate in sample_rates(),
        modulation in prop::option::of(0.0f64..2000.0),
        strength in -20.0f64..20.0,
    ) {
        let samples = synthesize_raw(freq, duration, rate, modulation, strength).unwrap();
        let expected = (duration * f64::from(rate)).floor() as usize;
        prop_assert_eq!(samples.len(), expected);

        let peak = samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
        if samples.iter().any(|&s| s != 0.0) {
            prop_assert_eq!(peak, 1.0);
        }
    }

    /// The envelope mirrors around the buffer midpoint for every fade length.
    #[test]
    fn envelope_symmetry(len in 1usize..2000, rate in sample_rates(), fade in 0.0f64..0.5) {
        let cutoff = fade_samples(len, rate, fade);
        let curve = envelope_curve(len, cutoff);
        for i in 0..cutoff {
            prop_assert_eq!(curve[i], curve[len - 1 - i]);
        }
        prop_assert!(curve.iter().all(|g| (0.0..=1.0).contains(g)));
    }

    /// Two lookups with equal parameters return byte-identical buffers, and
    /// match an uncached render.
    #[test]
    fn cache_idempotence(
        freq in 50.0f64..2000.0,
        duration in 0.01f64..0.2,
        volume in 0.0f64..=1.0,
        modulation in prop::option::of(0.0f64..500.0),
    ) {
        let cache = SynthesisCache::new();
        let params = SynthesisParams::new(freq, duration)
            .with_volume(volume)
            .with_modulation(modulation);
        let a = cache.get_or_create(&params).unwrap();
        let b = cache.get_or_create(&params).unwrap();
        prop_assert_eq!(a.to_le_bytes(), b.to_le_bytes());
        prop_assert_eq!(&*a, &render(&params).unwrap());
    }

    /// Quantized output never exceeds the requested volume.
    #[test]
    fn volume_bounds_output(freq in 50.0f64..2000.0, volume in 0.0f64..=1.0) {
        let params = SynthesisParams::new(freq, 0.05).with_volume(volume);
        let pcm = render(&params).unwrap();
        let limit = (volume * 32767.0).round() as i32;
        prop_assert!(pcm.samples().iter().all(|&s| i32::from(s).abs() <= limit));
    }
}
