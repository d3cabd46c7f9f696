//! Display device enumeration engine

use crate::api::{DisplayDeviceRecord, EnumerationResult, NameField, ScanWarning};
use crate::config::EnumeratorConfig;
use crate::error::{EnumerationError, Result};
use crate::topology::{BusDevice, TopologySession, TopologySource};
use crate::vendors::VendorLabeler;
use std::sync::{Mutex, PoisonError};

/// One scan at a time per process
static SCAN_LOCK: Mutex<()> = Mutex::new(());

/// Scans a topology source for display-class devices
pub struct DeviceEnumerator {
    config: EnumeratorConfig,
    labeler: Box<dyn VendorLabeler>,
}

impl DeviceEnumerator {
    /// Create an enumerator using the configured vendor label strategy
    pub fn new(config: EnumeratorConfig) -> Result<Self> {
        let labeler = config.vendor_labels.labeler();
        Self::with_labeler(config, labeler)
    }

    /// Create an enumerator with a custom vendor label resolver
    pub fn with_labeler(config: EnumeratorConfig, labeler: Box<dyn VendorLabeler>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, labeler })
    }

    /// Run one scan against `source`.
    ///
    /// The topology handle is held only for the duration of the call and is
    /// released on every return path. Devices past `max_results` are counted
    /// in [`EnumerationResult::dropped`] and reported as a warning.
    pub fn enumerate(&self, source: &dyn TopologySource) -> Result<EnumerationResult> {
        let _guard = SCAN_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = source.open()?;
        let devices = session.scan().map_err(|e| match e {
            EnumerationError::TopologyUnavailable(_) => e,
            other => EnumerationError::TopologyUnavailable(format!("scan failed: {}", other)),
        })?;

        let capacity = self.config.max_results;
        let mut result = EnumerationResult::default();

        for device in &devices {
            if !self.config.accepts_class(device.device_class) {
                continue;
            }
            if result.records.len() >= capacity {
                result.dropped += 1;
                continue;
            }

            let record = self.describe(&*session, device, &mut result.warnings);
            log::debug!(
                "Found display device {:04x}:{:04x} [{:04x}] {}",
                device.vendor_id,
                device.device_id,
                device.device_class,
                record.description
            );
            result.records.push(record);
        }

        drop(session);

        if result.dropped > 0 {
            log::warn!(
                "Display device limit of {} reached; {} device(s) left out",
                capacity,
                result.dropped
            );
            result.warnings.push(ScanWarning::CapacityExceeded {
                capacity,
                dropped: result.dropped,
            });
        }

        log::info!(
            "Scanned {} bus device(s), {} display device(s)",
            devices.len(),
            result.count()
        );

        Ok(result)
    }

    /// Format one device, falling back to sentinels for missing names
    fn describe(
        &self,
        session: &dyn TopologySession,
        device: &BusDevice,
        warnings: &mut Vec<ScanWarning>,
    ) -> DisplayDeviceRecord {
        let vendor = self
            .labeler
            .label(session, device.vendor_id)
            .unwrap_or_else(|| {
                self.unresolved(device, NameField::Vendor, warnings);
                self.config.unknown_vendor.clone()
            });
        let name = session
            .device_name(device.vendor_id, device.device_id)
            .unwrap_or_else(|| {
                self.unresolved(device, NameField::Device, warnings);
                self.config.unknown_device.clone()
            });

        DisplayDeviceRecord {
            description: format!("{} {}", vendor, name),
            vendor_id: device.vendor_id,
            device_id: device.device_id,
            device_class: device.device_class,
            address: device.address.clone(),
        }
    }

    fn unresolved(&self, device: &BusDevice, field: NameField, warnings: &mut Vec<ScanWarning>) {
        log::warn!(
            "No {:?} name for {:04x}:{:04x}",
            field,
            device.vendor_id,
            device.device_id
        );
        warnings.push(ScanWarning::NameResolutionFailed {
            vendor_id: device.vendor_id,
            device_id: device.device_id,
            field,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_RESULTS;
    use crate::topology::{MockTopologySession, MockTopologySource, SnapshotTopology};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn nvidia_and_nic() -> SnapshotTopology {
        SnapshotTopology::new(vec![
            BusDevice::new(0x10de, 0x1180, 0x0300),
            BusDevice::new(0x8086, 0x100e, 0x0200),
        ])
        .with_vendor(0x10de, "NVIDIA Corporation")
        .with_vendor(0x8086, "Intel Corporation")
        .with_device_name(0x10de, 0x1180, "GK104 [GeForce GTX 680]")
        .with_device_name(0x8086, 0x100e, "82540EM Gigabit Ethernet Controller")
    }

    #[test]
    fn test_network_device_is_filtered_out() {
        init_logger();
        let enumerator = DeviceEnumerator::new(EnumeratorConfig::static_labels()).unwrap();
        let result = enumerator.enumerate(&nvidia_and_nic()).unwrap();

        assert_eq!(result.count(), 1);
        assert_eq!(result.descriptions(), vec!["NVIDIA GK104 [GeForce GTX 680]"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_topology_labels_use_full_vendor_name() {
        let enumerator = DeviceEnumerator::new(EnumeratorConfig::topology_labels()).unwrap();
        let result = enumerator.enumerate(&nvidia_and_nic()).unwrap();
        assert_eq!(
            result.descriptions(),
            vec!["NVIDIA Corporation GK104 [GeForce GTX 680]"]
        );
    }

    #[test]
    fn test_all_display_classes_are_reported_in_order() {
        let topology = SnapshotTopology::new(vec![
            BusDevice::new(0x1002, 0x0001, 0x0380),
            BusDevice::new(0x1002, 0x0002, 0x0302),
            BusDevice::new(0x1002, 0x0003, 0x0600),
            BusDevice::new(0x1002, 0x0004, 0x0301),
            BusDevice::new(0x1002, 0x0005, 0x0300),
            BusDevice::new(0x1002, 0x0006, 0x3080),
        ]);
        let enumerator = DeviceEnumerator::new(EnumeratorConfig::static_labels()).unwrap();
        let result = enumerator.enumerate(&topology).unwrap();

        let ids: Vec<u16> = result.records.iter().map(|r| r.device_id).collect();
        assert_eq!(ids, vec![0x0001, 0x0002, 0x0004, 0x0005]);
    }

    #[test]
    fn test_extra_class_codes_are_accepted() {
        let topology = SnapshotTopology::new(vec![BusDevice::new(0x1002, 0x0006, 0x3080)]);
        let config = EnumeratorConfig {
            extra_class_codes: vec![0x3080],
            ..EnumeratorConfig::static_labels()
        };
        let result = DeviceEnumerator::new(config).unwrap().enumerate(&topology).unwrap();
        assert_eq!(result.count(), 1);
    }

    #[test]
    fn test_unknown_vendor_uses_sentinel() {
        let topology = SnapshotTopology::new(vec![
            BusDevice::new(0xffff, 0x0001, 0x0300),
            BusDevice::new(0x10de, 0x1180, 0x0300),
        ])
        .with_device_name(0xffff, 0x0001, "Mystery Adapter")
        .with_device_name(0x10de, 0x1180, "GK104 [GeForce GTX 680]");

        let enumerator = DeviceEnumerator::new(EnumeratorConfig::static_labels()).unwrap();
        let result = enumerator.enumerate(&topology).unwrap();

        assert_eq!(
            result.descriptions(),
            vec!["Unknown Vendor Mystery Adapter", "NVIDIA GK104 [GeForce GTX 680]"]
        );
        assert_eq!(
            result.warnings,
            vec![ScanWarning::NameResolutionFailed {
                vendor_id: 0xffff,
                device_id: 0x0001,
                field: NameField::Vendor,
            }]
        );
    }

    #[test]
    fn test_unknown_device_uses_sentinel() {
        let topology = SnapshotTopology::new(vec![BusDevice::new(0x10de, 0xbeef, 0x0302)]);
        let enumerator = DeviceEnumerator::new(EnumeratorConfig::static_labels()).unwrap();
        let result = enumerator.enumerate(&topology).unwrap();

        assert_eq!(result.descriptions(), vec!["NVIDIA Unknown Device"]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_capacity_bound_is_enforced_and_signalled() {
        let devices = (0..(MAX_RESULTS + 5) as u16)
            .map(|i| BusDevice::new(0x10de, i, 0x0300))
            .collect();
        let topology = SnapshotTopology::new(devices);
        let enumerator = DeviceEnumerator::new(EnumeratorConfig::static_labels()).unwrap();
        let result = enumerator.enumerate(&topology).unwrap();

        assert_eq!(result.count(), MAX_RESULTS);
        assert_eq!(result.dropped, 5);
        assert!(result.is_truncated());
        assert!(result.warnings.contains(&ScanWarning::CapacityExceeded {
            capacity: MAX_RESULTS,
            dropped: 5,
        }));
        // first devices win
        assert_eq!(result.records.last().map(|r| r.device_id), Some(MAX_RESULTS as u16 - 1));
    }

    #[test]
    fn test_exact_capacity_is_not_truncated() {
        let devices = (0..3u16).map(|i| BusDevice::new(0x10de, i, 0x0300)).collect();
        let config = EnumeratorConfig {
            max_results: 3,
            ..EnumeratorConfig::static_labels()
        };
        let result = DeviceEnumerator::new(config)
            .unwrap()
            .enumerate(&SnapshotTopology::new(devices))
            .unwrap();
        assert_eq!(result.count(), 3);
        assert!(!result.is_truncated());
    }

    #[test]
    fn test_repeated_scans_are_equivalent() {
        let enumerator = DeviceEnumerator::new(EnumeratorConfig::default()).unwrap();
        let topology = nvidia_and_nic();
        let first = enumerator.enumerate(&topology).unwrap();
        let second = enumerator.enumerate(&topology).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unavailable_topology_fails() {
        let enumerator = DeviceEnumerator::new(EnumeratorConfig::default()).unwrap();
        let err = enumerator
            .enumerate(&SnapshotTopology::unavailable("no PCI access"))
            .unwrap_err();
        assert!(matches!(err, EnumerationError::TopologyUnavailable(_)));
    }

    #[test]
    fn test_open_failure_from_source_is_propagated() {
        let mut source = MockTopologySource::new();
        source
            .expect_open()
            .times(1)
            .returning(|| Err(EnumerationError::TopologyUnavailable("denied".to_string())));

        let enumerator = DeviceEnumerator::new(EnumeratorConfig::default()).unwrap();
        let err = enumerator.enumerate(&source).unwrap_err();
        assert!(matches!(err, EnumerationError::TopologyUnavailable(ref m) if m == "denied"));
    }

    #[test]
    fn test_scan_failure_becomes_topology_unavailable() {
        let mut session = MockTopologySession::new();
        session.expect_scan().times(1).returning(|| {
            Err(EnumerationError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "bus read error",
            )))
        });
        let mut source = MockTopologySource::new();
        source
            .expect_open()
            .times(1)
            .return_once(move || Ok(Box::new(session)));

        let enumerator = DeviceEnumerator::new(EnumeratorConfig::default()).unwrap();
        let err = enumerator.enumerate(&source).unwrap_err();
        assert!(matches!(err, EnumerationError::TopologyUnavailable(_)));
    }

    #[test]
    fn test_device_names_always_come_from_session() {
        let mut session = MockTopologySession::new();
        session
            .expect_scan()
            .returning(|| Ok(vec![BusDevice::new(0x1002, 0x73bf, 0x0300)]));
        session.expect_vendor_name().never();
        session
            .expect_device_name()
            .withf(|v, d| *v == 0x1002 && *d == 0x73bf)
            .times(1)
            .returning(|_, _| Some("Navi 21".to_string()));
        let mut source = MockTopologySource::new();
        source.expect_open().return_once(move || Ok(Box::new(session)));

        let enumerator = DeviceEnumerator::new(EnumeratorConfig::static_labels()).unwrap();
        let result = enumerator.enumerate(&source).unwrap();
        assert_eq!(result.descriptions(), vec!["ATI Navi 21"]);
    }

    struct TrackedSource {
        released: Arc<AtomicBool>,
        fail_scan: bool,
    }

    struct TrackedSession {
        released: Arc<AtomicBool>,
        fail_scan: bool,
    }

    impl Drop for TrackedSession {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    impl TopologySource for TrackedSource {
        fn open(&self) -> Result<Box<dyn TopologySession>> {
            Ok(Box::new(TrackedSession {
                released: Arc::clone(&self.released),
                fail_scan: self.fail_scan,
            }))
        }
    }

    impl TopologySession for TrackedSession {
        fn scan(&mut self) -> Result<Vec<BusDevice>> {
            if self.fail_scan {
                return Err(EnumerationError::TopologyUnavailable("scan refused".to_string()));
            }
            Ok(vec![BusDevice::new(0x10de, 0x1180, 0x0300); 4])
        }

        fn vendor_name(&self, _vendor_id: u16) -> Option<String> {
            None
        }

        fn device_name(&self, _vendor_id: u16, _device_id: u16) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_handle_released_on_every_path() {
        for (fail_scan, max_results) in [(false, 512), (false, 2), (true, 512)] {
            let released = Arc::new(AtomicBool::new(false));
            let source = TrackedSource {
                released: Arc::clone(&released),
                fail_scan,
            };
            let config = EnumeratorConfig {
                max_results,
                ..EnumeratorConfig::default()
            };
            let outcome = DeviceEnumerator::new(config).unwrap().enumerate(&source);

            assert_eq!(outcome.is_err(), fail_scan);
            assert!(released.load(Ordering::SeqCst), "handle leaked (fail_scan={fail_scan}, max={max_results})");
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EnumeratorConfig {
            max_results: 0,
            ..EnumeratorConfig::default()
        };
        assert!(matches!(
            DeviceEnumerator::new(config),
            Err(EnumerationError::InvalidConfig(_))
        ));
    }

    struct CountingSource {
        open: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    struct CountingSession {
        open: Arc<AtomicUsize>,
    }

    impl Drop for CountingSession {
        fn drop(&mut self) {
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl TopologySource for CountingSource {
        fn open(&self) -> Result<Box<dyn TopologySession>> {
            let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            Ok(Box::new(CountingSession {
                open: Arc::clone(&self.open),
            }))
        }
    }

    impl TopologySession for CountingSession {
        fn scan(&mut self) -> Result<Vec<BusDevice>> {
            thread::sleep(Duration::from_millis(5));
            Ok(vec![BusDevice::new(0x10de, 0x1180, 0x0300)])
        }

        fn vendor_name(&self, _vendor_id: u16) -> Option<String> {
            None
        }

        fn device_name(&self, _vendor_id: u16, _device_id: u16) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_concurrent_scans_are_serialized() {
        let open = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = CountingSource {
                    open: Arc::clone(&open),
                    peak: Arc::clone(&peak),
                };
                thread::spawn(move || {
                    DeviceEnumerator::new(EnumeratorConfig::static_labels())
                        .unwrap()
                        .enumerate(&source)
                        .map(|result| result.count())
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 1);
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(open.load(Ordering::SeqCst), 0);
    }

    struct CrashingSource;

    impl TopologySource for CrashingSource {
        fn open(&self) -> Result<Box<dyn TopologySession>> {
            panic!("topology driver crashed");
        }
    }

    #[test]
    fn test_scan_after_crashed_scan_succeeds() {
        let crashed = thread::spawn(|| {
            let enumerator = DeviceEnumerator::new(EnumeratorConfig::default()).unwrap();
            let _ = enumerator.enumerate(&CrashingSource);
        })
        .join();
        assert!(crashed.is_err());

        let enumerator = DeviceEnumerator::new(EnumeratorConfig::static_labels()).unwrap();
        let result = enumerator.enumerate(&nvidia_and_nic()).unwrap();
        assert_eq!(result.count(), 1);
    }
}
