/// Sound engine: procedural synth effects via rodio.
///
/// Every effect is rendered to an in-memory WAV buffer at init time and
/// played fire-and-forget through a detached Sink.
///
/// Without the "sound" feature the stub SoundEngine does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_damage: Arc<Vec<u8>>,
        sfx_item: Arc<Vec<u8>>,
        sfx_zone: Arc<Vec<u8>>,
        sfx_checkpoint: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
        sfx_toggle: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&gen_sweep(220.0, 660.0, 0.12, 0.25))),
                sfx_damage: Arc::new(make_wav(&gen_damage())),
                sfx_item: Arc::new(make_wav(&gen_notes(&[880.0, 1175.0, 1397.0], 0.05, 0.25))),
                sfx_zone: Arc::new(make_wav(&gen_sweep(520.0, 180.0, 0.3, 0.2))),
                sfx_checkpoint: Arc::new(make_wav(&gen_notes(&[659.0, 988.0], 0.08, 0.25))),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
                sfx_toggle: Arc::new(make_wav(&gen_blip(1200.0, 0.04, 0.2))),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_damage(&self) { self.play(&self.sfx_damage); }
        pub fn play_item(&self) { self.play(&self.sfx_item); }
        pub fn play_zone(&self) { self.play(&self.sfx_zone); }
        pub fn play_checkpoint(&self) { self.play(&self.sfx_checkpoint); }
        pub fn play_game_over(&self) { self.play(&self.sfx_game_over); }
        pub fn play_toggle(&self) { self.play(&self.sfx_toggle); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators, mono f32 samples
    // ════════════════════════════════════════════════════════════

    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Linear pitch glide; phase is accumulated so the sweep stays clean.
    fn gen_sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (from + (to - from) * t) / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (phase * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Arpeggio with a third harmonic for a brighter edge.
    fn gen_notes(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * note_dur) as usize;
        notes
            .iter()
            .flat_map(|&freq| {
                (0..n).map(move |i| {
                    let t = i as f32 / SAMPLE_RATE as f32;
                    let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                    let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                    wave * env * volume
                })
            })
            .collect()
    }

    /// Hit: low tone buried in LCG noise.
    fn gen_damage() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.14) as usize;
        let mut rng: u32 = 0x5eed;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * (160.0 - t * 80.0) * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.5 + noise * 0.5) * (1.0 - t) * 0.3
            })
            .collect()
    }

    /// Descending minor run with a tail fade.
    fn gen_game_over() -> Vec<f32> {
        let mut samples = gen_notes(&[392.0, 311.0, 261.0, 196.0], 0.14, 0.3);
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&gen_blip(440.0, 0.01, 0.5));
            let samples = (SAMPLE_RATE as f32 * 0.01) as usize;
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(wav.len(), 44 + samples * 2);
        }

        #[test]
        fn generators_stay_in_range() {
            for s in gen_damage().into_iter().chain(gen_game_over()) {
                assert!((-1.0..=1.0).contains(&s));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API, no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_damage(&self) {}
    pub fn play_item(&self) {}
    pub fn play_zone(&self) {}
    pub fn play_checkpoint(&self) {}
    pub fn play_game_over(&self) {}
    pub fn play_toggle(&self) {}
}
