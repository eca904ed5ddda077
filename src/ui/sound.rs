/// Sound engine: procedural 8-bit style sound effects and a looped
/// background track via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer once, at init.
/// Playback is fire-and-forget (non-blocking) via a detached rodio Sink.
/// The music loop lives in its own long-lived Sink that is paused and
/// resumed, never rebuilt.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

/// One entry per feedback hook the game emits.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Move,
    Invalid,
    Collect,
    Deposit,
    Push,
    Trigger,
    Fall,
    LevelComplete,
    GameOver,
}

impl Sfx {
    pub const ALL: [Sfx; 9] = [
        Sfx::Move,
        Sfx::Invalid,
        Sfx::Collect,
        Sfx::Deposit,
        Sfx::Push,
        Sfx::Trigger,
        Sfx::Fall,
        Sfx::LevelComplete,
        Sfx::GameOver,
    ];
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::debug;

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Indexed like `Sfx::ALL`.
        buffers: Vec<Arc<Vec<u8>>>,
        /// Background loop; starts paused.
        music: Option<Sink>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            let buffers = Sfx::ALL.iter().map(|&s| Arc::new(make_wav(&synth(s)))).collect();
            let music = match Sink::try_new(&handle) {
                Ok(sink) => {
                    sink.pause();
                    sink.append(SamplesBuffer::new(1, SAMPLE_RATE, music_loop()).repeat_infinite());
                    Some(sink)
                }
                Err(e) => {
                    debug!(error = %e, "no music sink");
                    None
                }
            };
            Some(SoundEngine { _stream: stream, handle, buffers, music })
        }

        /// Resume or pause the background loop. Cheap to call every frame.
        pub fn set_music(&self, on: bool) {
            let Some(sink) = &self.music else { return };
            if on && sink.is_paused() {
                sink.play();
            } else if !on && !sink.is_paused() {
                sink.pause();
            }
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(sfx as usize) else { return };
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    let cursor = Cursor::new(buf.as_ref().clone());
                    if let Ok(src) = rodio::Decoder::new(cursor) {
                        sink.append(src);
                        sink.detach(); // fire-and-forget
                    }
                }
                Err(e) => debug!(error = %e, ?sfx, "no sink"),
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Effect recipes
    // ════════════════════════════════════════════════════════════

    pub(super) fn synth(sfx: Sfx) -> Vec<f32> {
        match sfx {
            // Soft short tick
            Sfx::Move => notes(&[(880.0, 0.025)], &[1.0], 0.12),
            // Low double buzz
            Sfx::Invalid => notes(&[(140.0, 0.06), (110.0, 0.08)], &[0.6, 0.0, 0.4], 0.25),
            // Quick ascending arpeggio C6→E6→G6
            Sfx::Collect => notes(&[(1047.0, 0.045), (1319.0, 0.045), (1568.0, 0.045)], &[0.7, 0.0, 0.3], 0.25),
            // Paper dropping into a bucket: falling blip
            Sfx::Deposit => sweep(900.0, 350.0, 0.09, 0.1, 0.25),
            // Scrape: noisy low sweep
            Sfx::Push => sweep(220.0, 160.0, 0.1, 0.5, 0.22),
            // Rising chime G5→C6→E6
            Sfx::Trigger => notes(&[(784.0, 0.07), (1047.0, 0.07), (1319.0, 0.16)], &[0.7, 0.3], 0.28),
            // Descending whistle 600Hz → 150Hz
            Sfx::Fall => sweep(600.0, 150.0, 0.35, 0.0, 0.25),
            // Fanfare C5→E5→G5→C6, last note held
            Sfx::LevelComplete => notes(
                &[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)],
                &[0.6, 0.3, 0.1],
                0.3,
            ),
            // Sad descent A4→F#4→Eb4→C4
            Sfx::GameOver => notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.3)], &[1.0], 0.3),
        }
    }

    /// Four bars at 120 bpm: a plucked C-major melody over a slow bass line.
    /// Both voices span the same number of samples so the loop seam is clean.
    pub(super) fn music_loop() -> Vec<f32> {
        const MELODY: [(f32, f32); 16] = [
            (523.0, 0.25), (659.0, 0.25), (784.0, 0.25), (659.0, 0.25),
            (587.0, 0.25), (698.0, 0.25), (880.0, 0.25), (698.0, 0.25),
            (523.0, 0.25), (659.0, 0.25), (784.0, 0.25), (1047.0, 0.25),
            (988.0, 0.25), (784.0, 0.25), (587.0, 0.25), (494.0, 0.25),
        ];
        const BASS: [(f32, f32); 4] = [(131.0, 1.0), (147.0, 1.0), (131.0, 1.0), (98.0, 1.0)];

        let melody = notes(&MELODY, &[0.7, 0.0, 0.2], 0.08);
        let bass = notes(&BASS, &[1.0, 0.3], 0.1);
        let len = melody.len().max(bass.len());
        (0..len)
            .map(|i| melody.get(i).copied().unwrap_or(0.0) + bass.get(i).copied().unwrap_or(0.0))
            .collect()
    }

    /// A run of notes `(freq, seconds)`, each with a decaying envelope.
    /// `harmonics[k]` is the weight of the (k+1)-th harmonic.
    fn notes(seq: &[(f32, f32)], harmonics: &[f32], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.7);
                let wave: f32 = harmonics.iter().enumerate()
                    .map(|(k, w)| (t * freq * (k + 1) as f32 * TAU).sin() * w)
                    .sum();
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Linear pitch sweep mixed with LCG noise (`noise` in 0..1).
    fn sweep(from: f32, to: f32, dur: f32, noise: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * dur) as usize;
        let mut rng: u32 = 0x2F6E_2B1;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32;
                let tone = (phase * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let hiss = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.6);
                (tone * (1.0 - noise) + hiss * noise) * env * volume
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let bits: u16 = 16;
        let block_align: u16 = bits / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&1u16.to_le_bytes());  // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
    pub fn set_music(&self, _on: bool) {}
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::{make_wav, music_loop, synth};
    use super::Sfx;

    #[test]
    fn every_effect_is_audible_and_bounded() {
        for sfx in Sfx::ALL {
            let s = synth(sfx);
            assert!(!s.is_empty(), "{sfx:?}");
            assert!(s.iter().all(|v| v.abs() <= 1.0), "{sfx:?} clips");
            assert!(s.iter().any(|v| v.abs() > 0.01), "{sfx:?} silent");
        }
    }

    #[test]
    fn music_loop_is_four_seconds_and_never_clips() {
        let m = music_loop();
        let secs = m.len() as f32 / 22050.0;
        assert!((secs - 4.0).abs() < 0.01, "{secs}");
        assert!(m.iter().all(|v| v.abs() <= 1.0));
        assert!(m.iter().any(|v| v.abs() > 0.05));
    }

    #[test]
    fn wav_header_matches_payload() {
        let wav = make_wav(&[0.0, 0.5, -0.5, 1.5]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(wav.len(), 44 + 8);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
        // Clamped to full scale
        assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
    }
}
