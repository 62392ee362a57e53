//! Generated stand-in modules for missing enhancements.

use std::fmt::Write as _;

use safedocs_config::EnhancementDescriptor;

/// First line of every generated stand-in.
pub const STUB_MARKER: &str = "# safedocs-setup: generated stand-in";

/// Message raised by every stand-in capability.
#[must_use]
pub fn not_installed_message(enhancement: &str) -> String {
    format!("enhancement not installed: {enhancement}")
}

/// Whether module bytes were generated by [`render_stub`]. Works on raw
/// bytes so modules in any source encoding can be classified.
#[must_use]
pub fn is_stub(source: &[u8]) -> bool {
    source.starts_with(STUB_MARKER.as_bytes())
}

/// Python source for a stand-in: construction succeeds, every capability raises.
#[must_use]
pub fn render_stub(descriptor: &EnhancementDescriptor) -> String {
    let message = not_installed_message(&descriptor.name);
    let mut out = String::new();
    let _ = writeln!(out, "{STUB_MARKER} for '{}'", descriptor.name);
    out.push_str("# Replace this file with the real module to enable the enhancement.\n\n");
    let _ = writeln!(out, "ENHANCEMENT_NAME = {:?}", descriptor.name);
    out.push_str("AVAILABLE = False\n\n\n");
    out.push_str("class EnhancementNotInstalled(RuntimeError):\n    pass\n\n\n");
    let _ = writeln!(out, "class {}:", descriptor.class);
    out.push_str("    available = False\n\n");
    out.push_str("    def __init__(self, *args, **kwargs):\n        pass\n");
    for capability in &descriptor.capabilities {
        let _ = write!(
            out,
            "\n    def {capability}(self, *args, **kwargs):\n        raise EnhancementNotInstalled({message:?})\n"
        );
    }
    out
}
