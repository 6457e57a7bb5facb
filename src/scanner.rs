//! Device-node discovery.
//!
//! Lists the privileged device directory through the [`Bridge`] and keeps the
//! entries that look like input-device nodes (`event` followed by digits).
//! Discovery never fails loudly: a bridge error and an empty listing both
//! yield an empty result, and downstream remap behavior simply never activates
//! for that session.

use crate::bridge::{Bridge, DEVICE_DIR};
use serde::Serialize;

/// A candidate input-device node found by a scan.
///
/// Recomputed on every scan; there is no persisted identity. `path` is what a
/// bridge's [`open_stream`](crate::bridge::Bridge::open_stream) expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    /// Full path of the node (e.g. `/dev/input/event2`).
    pub path: String,
    /// Bare entry name (e.g. `event2`).
    pub name: String,
}

/// `true` for names of the form `event<digits>`.
pub(crate) fn is_event_node(name: &str) -> bool {
    match name.strip_prefix("event") {
        Some(digits) if !digits.is_empty() => digits.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

/// List candidate input-device nodes under [`DEVICE_DIR`].
pub fn scan(bridge: &dyn Bridge) -> Vec<DeviceDescriptor> {
    scan_dir(bridge, DEVICE_DIR)
}

/// Like [`scan`], with an explicit device directory.
///
/// Ordering follows whatever the underlying listing provides; no sorting is
/// applied here.
pub fn scan_dir(bridge: &dyn Bridge, dir: &str) -> Vec<DeviceDescriptor> {
    let entries = match bridge.list_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("device scan of {dir} failed: {err}");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter(|name| is_event_node(name))
        .map(|name| DeviceDescriptor {
            path: format!("{dir}/{name}"),
            name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DeviceStream;
    use std::io;

    struct ListingBridge(io::Result<Vec<String>>);

    impl Bridge for ListingBridge {
        fn list_dir(&self, _dir: &str) -> io::Result<Vec<String>> {
            match &self.0 {
                Ok(entries) => Ok(entries.clone()),
                Err(err) => Err(io::Error::new(err.kind(), "listing failed")),
            }
        }

        fn open_stream(&self, _path: &str) -> io::Result<DeviceStream> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "listing only"))
        }
    }

    #[test]
    fn event_node_filter() {
        assert!(is_event_node("event0"));
        assert!(is_event_node("event17"));
        assert!(!is_event_node("event"));
        assert!(!is_event_node("event1a"));
        assert!(!is_event_node("mice"));
        assert!(!is_event_node("mouse0"));
        assert!(!is_event_node("uevent3"));
    }

    #[test]
    fn scan_keeps_only_event_nodes() {
        let bridge = ListingBridge(Ok(vec![
            "by-path".into(),
            "event0".into(),
            "event12".into(),
            "mice".into(),
        ]));
        let found = scan_dir(&bridge, "/dev/input");
        assert_eq!(
            found,
            vec![
                DeviceDescriptor {
                    path: "/dev/input/event0".into(),
                    name: "event0".into(),
                },
                DeviceDescriptor {
                    path: "/dev/input/event12".into(),
                    name: "event12".into(),
                },
            ]
        );
    }

    #[test]
    fn bridge_failure_scans_empty() {
        let bridge = ListingBridge(Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert!(scan_dir(&bridge, "/dev/input").is_empty());
    }

    #[test]
    fn empty_listing_scans_empty() {
        let bridge = ListingBridge(Ok(Vec::new()));
        assert!(scan(&bridge).is_empty());
    }
}
