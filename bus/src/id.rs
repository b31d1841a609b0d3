//! Hardware identities and driver identity tables.

/// Identity a peripheral reports during enumeration.
///
/// Only `mfg_id` and `part_id` take part in matching; `unique_id` tells apart identical
/// parts sharing one link and `class_id` is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlaveId {
    pub mfg_id: u16,
    pub part_id: u16,
    pub unique_id: u8,
    pub class_id: u8,
}

impl SlaveId {
    pub const fn new(mfg_id: u16, part_id: u16) -> SlaveId {
        SlaveId {
            mfg_id,
            part_id,
            unique_id: 0,
            class_id: 0,
        }
    }

    pub const fn with_unique_id(mut self, unique_id: u8) -> SlaveId {
        self.unique_id = unique_id;
        self
    }

    pub const fn with_class_id(mut self, class_id: u8) -> SlaveId {
        self.class_id = class_id;
        self
    }
}

/// One entry of a peripheral driver's identity table.
///
/// `driver_data` is opaque to the bus and handed back to the driver in probe, so one driver
/// can tell apart the parts it supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub mfg_id: u16,
    pub part_id: u16,
    pub driver_data: usize,
}

impl DeviceId {
    pub const fn new(mfg_id: u16, part_id: u16) -> DeviceId {
        DeviceId {
            mfg_id,
            part_id,
            driver_data: 0,
        }
    }

    pub const fn with_data(mut self, driver_data: usize) -> DeviceId {
        self.driver_data = driver_data;
        self
    }

    /// Exact (manufacturer, part) comparison.
    pub fn matches(&self, id: &SlaveId) -> bool {
        self.mfg_id == id.mfg_id && self.part_id == id.part_id
    }
}

/// Find the first entry of `table` that matches `id`, in table order.
pub fn find_device_id<'a>(table: &'a [DeviceId], id: &SlaveId) -> Option<&'a DeviceId> {
    table.iter().find(|entry| entry.matches(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pair_only() {
        let table = [DeviceId::new(0x025d, 0x0711), DeviceId::new(0x025d, 0x1308)];
        assert!(find_device_id(&table, &SlaveId::new(0x025d, 0x1308)).is_some());
        assert!(find_device_id(&table, &SlaveId::new(0x025d, 0x0712)).is_none());
        assert!(find_device_id(&table, &SlaveId::new(0x025e, 0x0711)).is_none());
        assert!(find_device_id(&[], &SlaveId::new(0x025d, 0x0711)).is_none());
    }

    #[test]
    fn first_entry_wins() {
        let table = [
            DeviceId::new(0x1234, 0x5678).with_data(1),
            DeviceId::new(0x1234, 0x5678).with_data(2),
        ];
        let hit = find_device_id(&table, &SlaveId::new(0x1234, 0x5678));
        assert_eq!(hit.map(|e| e.driver_data), Some(1));
    }

    #[test]
    fn unique_and_class_ignored() {
        let table = [DeviceId::new(0x1234, 0x5678)];
        let id = SlaveId::new(0x1234, 0x5678).with_unique_id(3).with_class_id(1);
        assert!(find_device_id(&table, &id).is_some());
    }
}
