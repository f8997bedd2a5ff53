//! Stream location and PCM shaping between decoder and device

#![cfg_attr(not(feature = "stream-audio"), allow(dead_code))]

/// Fetchable URL for a track source. Absolute URLs pass through, paths are
/// served from the API host; anything else (placeholder sources) has none.
pub fn stream_url(api_base_url: &str, source: &str) -> Option<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Some(source.to_string());
    }
    let path = source.strip_prefix('/')?;
    let base = api_base_url.trim_end_matches('/');
    let origin = base.strip_suffix("/api").unwrap_or(base);
    Some(format!("{origin}/{path}"))
}

/// File extension of the URL path, as a decoder hint
pub fn extension_hint(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    let plausible = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    plausible.then_some(ext)
}

/// Interleaved `from`-channel frames as `to`-channel frames. Mono is copied to
/// every output, a mono device gets the average, extra outputs stay silent.
pub fn remix(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(from)
        .flat_map(|frame| {
            (0..to).map(move |ch| match (from, to) {
                (1, _) => frame[0],
                (_, 1) => frame.iter().sum::<f32>() / from as f32,
                _ => frame.get(ch).copied().unwrap_or(0.0),
            })
        })
        .collect()
}

/// Linear interpolation from `from_rate` to `to_rate`, per packet
pub fn resample_linear(samples: &[f32], channels: usize, from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || channels == 0 {
        return samples.to_vec();
    }
    let frames = samples.len() / channels;
    if frames == 0 {
        return Vec::new();
    }

    let out_frames = (frames as u64 * u64::from(to_rate) / u64::from(from_rate)) as usize;
    let step = f64::from(from_rate) / f64::from(to_rate);
    let mut out = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        let pos = i as f64 * step;
        let left = (pos.floor() as usize).min(frames - 1);
        let right = (left + 1).min(frames - 1);
        let t = (pos - left as f64) as f32;
        for ch in 0..channels {
            let a = samples[left * channels + ch];
            let b = samples[right * channels + ch];
            out.push(a + (b - a) * t);
        }
    }
    out
}
