//! Host-specific runtime adjustments for the launched application

/// Rendering-layer hint consumed by Qt applications on macOS
pub const MAC_LAYER_VAR: &str = "QT_MAC_WANTS_LAYER";

/// An environment variable handed to the launched application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAdjustment {
    pub key: String,
    pub value: String,
}

/// Compute the adjustments for the current host
///
/// Applied to the child's environment only; the launcher never reads these
/// back. This step cannot fail.
pub fn adjustments() -> Vec<EnvAdjustment> {
    adjustments_for(std::env::consts::OS, |key| std::env::var_os(key).is_some())
}

fn adjustments_for(os: &str, is_set: impl Fn(&str) -> bool) -> Vec<EnvAdjustment> {
    let mut out = Vec::new();

    // macOS Qt rendering stutters without the layer-backed view hint
    if os == "macos" && !is_set(MAC_LAYER_VAR) {
        out.push(EnvAdjustment {
            key: MAC_LAYER_VAR.to_string(),
            value: "1".to_string(),
        });
    }

    out
}
