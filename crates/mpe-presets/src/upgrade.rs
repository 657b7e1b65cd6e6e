//! Rewriting settings files in the current format.

use crate::error::{Error, Result};
use crate::serializer::{
    import_settings_in_audio_thread, is_blank_or_comment, parse_lines, serialize, LINE_END,
    MAX_SIZE,
};
use mpe_core::EngineConfig;
use mpe_engine::Engine;
use std::fs;
use std::path::Path;

/// Reads a settings file of at most [`MAX_SIZE`] bytes.
///
/// Bytes that are not valid UTF-8 are replaced; the parser ignores them
/// anyway.
pub fn read_settings_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let size = fs::metadata(path)?.len();
    if size > MAX_SIZE as u64 {
        return Err(Error::TooLarge {
            size,
            max: MAX_SIZE,
        });
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Whole-line comments of `settings`, in order.
pub fn collect_comments(settings: &str) -> Vec<&str> {
    parse_lines(settings)
        .into_iter()
        .filter(|line| is_blank_or_comment(line))
        .collect()
}

/// Imports `settings` into a fresh engine and serializes it again, keeping
/// the comments at the top.
pub fn upgrade_settings(settings: &str) -> Result<String> {
    let (mut engine, _handle) = Engine::new(EngineConfig::default())?;
    let params = import_settings_in_audio_thread(&mut engine, settings);

    let mut upgraded = String::with_capacity(settings.len() + 256);
    for comment in collect_comments(settings) {
        upgraded.push_str(comment);
        upgraded.push_str(LINE_END);
    }
    upgraded.push_str(&serialize(engine.shared()));

    tracing::debug!(params, "settings upgraded");
    Ok(upgraded)
}

/// Upgrades a settings file in place.
pub fn upgrade_settings_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let settings = read_settings_file(path)?;
    let upgraded = upgrade_settings(&settings)?;
    fs::write(path, upgraded)?;
    Ok(())
}
