//! Capability negotiation
//!
//! Extension and layer names requested from the vulkan runtime are merged into
//! a [`CapabilitySet`] before any creation call. A set is built from up to
//! three sources: a hard required baseline, a baseline that only applies to
//! debug builds, and whatever the configuration supplies on top. Duplicates
//! collapse silently, the result has set semantics.
//!
//! There is no fallback policy here. The negotiated set is handed to the
//! creation call as-is and an unsupported entry surfaces as that call failing.

use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::targets;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilitySet {
    tokens: HashSet<CString>,
}

impl CapabilitySet {
    /// Merges the required baseline, the debug baseline (only if `debug` is
    /// set) and the configured extras into a duplicate free set.
    ///
    /// An empty result is valid.
    pub fn build(
        required: &[CString],
        debug_required: &[CString],
        configured: &[CString],
        debug: bool,
    ) -> Self {
        let mut tokens: HashSet<CString> = required.iter().cloned().collect();

        if debug {
            tokens.extend(debug_required.iter().cloned());
        }
        tokens.extend(configured.iter().cloned());

        if tokens.is_empty() {
            log::debug!(target: targets::INSTANCE, "Capability negotiation produced an empty set, nothing required");
        }

        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn contains(&self, token: &CStr) -> bool {
        self.tokens.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CString> {
        self.tokens.iter()
    }

    /// Returns the token pointers for a vulkan create call.
    ///
    /// The pointers borrow from this set and are only valid while it is alive
    /// and unmodified.
    pub fn as_ptr_vec(&self) -> Vec<*const c_char> {
        self.tokens.iter().map(|token| token.as_c_str().as_ptr()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cstrings(names: &[&str]) -> Vec<CString> {
        names.iter().map(|name| CString::new(*name).unwrap()).collect()
    }

    #[test]
    fn merge_is_order_independent() {
        let required = cstrings(&["VK_KHR_surface"]);
        let debug_required = cstrings(&["VK_EXT_debug_utils"]);
        let configured = cstrings(&["VK_KHR_display", "VK_EXT_headless_surface", "VK_KHR_surface"]);
        let mut reversed = configured.clone();
        reversed.reverse();

        let a = CapabilitySet::build(&required, &debug_required, &configured, true);
        let b = CapabilitySet::build(&required, &debug_required, &reversed, true);

        assert_eq!(a, b);
    }

    #[test]
    fn merge_is_idempotent() {
        let required = cstrings(&["VK_KHR_surface"]);
        let configured = cstrings(&["VK_KHR_display"]);

        let a = CapabilitySet::build(&required, &[], &configured, false);
        let b = CapabilitySet::build(&required, &[], &configured, false);

        assert_eq!(a, b);
    }

    #[test]
    fn debug_tokens_only_present_in_debug() {
        let required = cstrings(&["VK_KHR_surface"]);
        let debug_required = cstrings(&["VK_EXT_debug_utils"]);

        let with_debug = CapabilitySet::build(&required, &debug_required, &[], true);
        let without_debug = CapabilitySet::build(&required, &debug_required, &[], false);

        assert!(with_debug.contains(CStr::from_bytes_with_nul(b"VK_EXT_debug_utils\0").unwrap()));
        assert!(!without_debug.contains(CStr::from_bytes_with_nul(b"VK_EXT_debug_utils\0").unwrap()));
        assert_eq!(without_debug.len(), 1);
    }

    #[test]
    fn duplicates_collapse() {
        let required = cstrings(&["platform_surface"]);
        let debug_required = cstrings(&["debug_utils"]);
        let configured = cstrings(&["platform_surface"]);

        let set = CapabilitySet::build(&required, &debug_required, &configured, true);

        assert_eq!(set.len(), 2);
        assert!(set.contains(CStr::from_bytes_with_nul(b"platform_surface\0").unwrap()));
        assert!(set.contains(CStr::from_bytes_with_nul(b"debug_utils\0").unwrap()));
    }

    #[test]
    fn empty_result_is_valid() {
        let set = CapabilitySet::build(&[], &cstrings(&["debug_utils"]), &[], false);

        assert!(set.is_empty());
        assert_eq!(set.as_ptr_vec().len(), 0);
    }
}
