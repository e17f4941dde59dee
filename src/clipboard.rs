//! System clipboard access. The handle is opened per copy rather than kept
//! in `App`, since it is not `Send` on every platform.

#[cfg(feature = "clipboard")]
pub fn copy_text(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text.to_string()).map_err(|e| e.to_string())
}

#[cfg(not(feature = "clipboard"))]
pub fn copy_text(_text: &str) -> Result<(), String> {
    Err("built without clipboard support".to_string())
}
