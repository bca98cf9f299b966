use crate::desc::{DescriptionStore, GROUP_TYPE_BUNDLE};
use crate::transport::Transport;

/// Turns on multiplexing of bundled content once both sides agreed on it.
#[derive(Debug, Default)]
pub(crate) struct BundleNegotiator;

impl BundleNegotiator {
    /// Enable muxing if `ready` and both descriptions carry a BUNDLE group.
    ///
    /// Safe to call after any event, does nothing unless there is something to do.
    pub fn maybe_enable(
        &self,
        ready: bool,
        transport: &mut dyn Transport,
        store: &DescriptionStore,
    ) -> bool {
        if !ready || transport.is_muxed() {
            return false;
        }

        let (Some(local), Some(remote)) = (store.local(), store.remote()) else {
            return false;
        };

        if !remote.description().has_group(GROUP_TYPE_BUNDLE) {
            return false;
        }

        let Some(group) = local.description().group(GROUP_TYPE_BUNDLE) else {
            return false;
        };

        if transport.enable_muxing(group) {
            info!("Bundle enabled for {:?}", group.content_names);
            true
        } else {
            warn!("Failed to enable bundle for {:?}", group.content_names);
            false
        }
    }
}
