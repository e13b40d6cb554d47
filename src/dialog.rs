use std::path::PathBuf;

/// Ask the user for an audio file. Returns `None` when cancelled or when
/// the binary was built without native dialogs.
#[cfg(feature = "dialog")]
pub fn pick_audio_file(title: &str, extensions: &[String]) -> Option<PathBuf> {
    let picked = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Audio", extensions)
        .pick_file();

    if picked.is_none() {
        tracing::debug!("{} dialog cancelled", title);
    }
    picked
}

#[cfg(not(feature = "dialog"))]
pub fn pick_audio_file(title: &str, _extensions: &[String]) -> Option<PathBuf> {
    tracing::warn!("{}: no path given and file dialogs are not compiled in", title);
    None
}
