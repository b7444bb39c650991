//! Text shown next to each node on the map

/// Slots in the volume bar
pub const VOLUME_BAR_WIDTH: usize = 24;

/// Last path component, accepting both separators
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Node label: file name over either a percentage or a fixed-width bar
///
/// ```text
/// rain.mp3          rain.mp3
/// Volume: 50        [||||||||||||            ]
/// ```
pub fn volume_label(file_name: &str, volume: f32, simple: bool) -> String {
    let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    if simple {
        format!("{}\nVolume: {}", file_name, (volume * 100.0) as i32)
    } else {
        let bars = ((volume * VOLUME_BAR_WIDTH as f32).ceil() as usize).min(VOLUME_BAR_WIDTH);
        format!(
            "{}\n[{:<width$}]",
            file_name,
            "|".repeat(bars),
            width = VOLUME_BAR_WIDTH
        )
    }
}
