use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Capture rate the backend's voice models expect.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Start capturing audio from the default input device.
/// Samples are appended to the shared buffer at ~16kHz mono f32.
/// Drop the returned `Stream` to stop recording and release the device.
///
/// Errors here cover the denied-permission and no-device cases; the caller
/// surfaces them as a blocking notice and stays in the idle phase.
pub fn start_capture(
    buffer: Arc<Mutex<Vec<f32>>>,
) -> Result<(cpal::Stream, u32), Box<dyn std::error::Error>> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or("No microphone found. Check input devices and permissions.")?;

    log::info!("Input device: {:?}", device.description());

    let supported_configs: Vec<_> = device.supported_input_configs()?.collect();

    // Prefer a native 16kHz mono f32 config
    let desired = supported_configs.iter().find(|c| {
        c.channels() == 1
            && c.min_sample_rate() <= TARGET_SAMPLE_RATE
            && c.max_sample_rate() >= TARGET_SAMPLE_RATE
            && c.sample_format() == cpal::SampleFormat::F32
    });

    let (config, capture_rate, downsample_factor) = if let Some(cfg) = desired {
        let config = cfg.with_sample_rate(TARGET_SAMPLE_RATE).config();
        (config, TARGET_SAMPLE_RATE, 1usize)
    } else {
        // Fall back to the default config, decimating to ~16kHz
        let default_config = device.default_input_config()?;
        let rate = default_config.sample_rate();
        let factor = (rate / TARGET_SAMPLE_RATE).max(1) as usize;
        let actual_rate = rate / factor as u32;
        log::info!("Using native rate {rate}Hz, downsampling by {factor}x to ~{actual_rate}Hz");
        (default_config.config(), actual_rate, factor)
    };

    let channels = config.channels as usize;

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let mut buf = buffer.lock().unwrap();
            for (i, chunk) in data.chunks(channels).enumerate() {
                if i % downsample_factor == 0 {
                    let mono = chunk.iter().sum::<f32>() / channels as f32;
                    buf.push(mono);
                }
            }
        },
        |err| log::error!("Input stream error: {err}"),
        None,
    )?;

    stream.play()?;
    Ok((stream, capture_rate))
}

/// Convert captured f32 samples to WAV bytes (mono 16-bit PCM). This is the
/// form the clip is carried in until it is base64-encoded at submit time.
pub fn samples_to_wav(
    samples: &[f32],
    sample_rate: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        let i16_val = (clamped * i16::MAX as f32) as i16;
        writer.write_sample(i16_val)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Clip length in seconds for a sample count at a given rate.
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f32 / sample_rate as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_encoding_preserves_samples() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0, 2.0, -2.0];
        let wav = samples_to_wav(&samples, TARGET_SAMPLE_RATE).unwrap();

        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), samples.len());
        assert_eq!(decoded[0], 0);
        assert_eq!(decoded[1], (0.5 * i16::MAX as f32) as i16);
        // Out-of-range input is clamped, not wrapped.
        assert_eq!(decoded[5], i16::MAX);
        assert_eq!(decoded[6], -i16::MAX);
    }

    #[test]
    fn empty_capture_still_produces_a_valid_container() {
        let wav = samples_to_wav(&[], TARGET_SAMPLE_RATE).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn duration_matches_rate() {
        assert_eq!(duration_secs(16_000, 16_000), 1.0);
        assert_eq!(duration_secs(8_000, 16_000), 0.5);
        assert_eq!(duration_secs(100, 0), 0.0);
    }
}
