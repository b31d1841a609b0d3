//! Mock drivers and power domains shared by the integration tests.
#![allow(dead_code)]

use sdw::{
    Bus, DeviceId, DriverError, DriverHooks, Handle, Master, MasterDriver, Payload, PowerDomain,
    PowerError, Slave, SlaveDriver, SlaveId,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// Hook calls from several mocks, in call order, as `"<hook> <dev_name>"`.
pub type Journal = Mutex<Vec<String>>;

fn note(journal: &Option<Arc<Journal>>, hook: &str, dev_name: &str) {
    if let Some(j) = journal {
        j.lock().unwrap().push(format!("{} {}", hook, dev_name));
    }
}

#[derive(Default)]
pub struct MockPower {
    pub attached: AtomicUsize,
    pub detached: AtomicUsize,
    pub fail: Option<PowerError>,
}

impl PowerDomain for MockPower {
    fn attach(&self, _dev_name: &str, power_on: bool) -> Result<(), PowerError> {
        assert!(!power_on, "bus must not power devices on");
        self.attached.fetch_add(1, Ordering::SeqCst);
        self.fail.map_or(Ok(()), Err)
    }

    fn detach(&self, _dev_name: &str, power_off: bool) {
        assert!(!power_off, "bus must not power devices off");
        self.detached.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockCodec {
    pub name: &'static str,
    pub table: Vec<DeviceId>,
    pub hooks: DriverHooks,
    pub probe_err: Option<DriverError>,
    pub remove_err: Option<DriverError>,
    /// Timeout reported from `read_prop`; 0 reports nothing.
    pub report_timeout: u32,
    pub probes: AtomicUsize,
    pub removes: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub probed_names: Mutex<Vec<String>>,
    pub journal: Option<Arc<Journal>>,
}

impl MockCodec {
    pub fn new(name: &'static str, table: &[(u16, u16)]) -> MockCodec {
        MockCodec {
            name,
            table: table.iter().map(|&(m, p)| DeviceId::new(m, p)).collect(),
            hooks: DriverHooks::PROBE
                | DriverHooks::REMOVE
                | DriverHooks::SHUTDOWN
                | DriverHooks::READ_PROP,
            probe_err: None,
            remove_err: None,
            report_timeout: 0,
            probes: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            probed_names: Mutex::new(vec![]),
            journal: None,
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl SlaveDriver for MockCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn id_table(&self) -> &[DeviceId] {
        &self.table
    }

    fn hooks(&self) -> DriverHooks {
        self.hooks
    }

    fn probe(&self, slave: &Slave, _id: &DeviceId) -> Result<(), DriverError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probed_names
            .lock()
            .unwrap()
            .push(slave.dev_name().to_string());
        self.probe_err.map_or(Ok(()), Err)
    }

    fn remove(&self, slave: &Slave) -> Result<(), DriverError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        note(&self.journal, "remove", slave.dev_name());
        self.remove_err.map_or(Ok(()), Err)
    }

    fn shutdown(&self, slave: &Slave) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        note(&self.journal, "shutdown", slave.dev_name());
    }

    fn read_prop(&self, slave: &Slave) {
        if self.report_timeout != 0 {
            let t = self.report_timeout;
            slave.update_properties(|p| p.clk_stop_timeout = t);
        }
    }
}

pub struct MockController {
    pub name: &'static str,
    pub hooks: DriverHooks,
    pub probe_err: Option<DriverError>,
    pub startup_err: Option<DriverError>,
    pub probes: AtomicUsize,
    pub removes: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub startups: AtomicUsize,
    pub wakes: AtomicUsize,
    pub payloads: Mutex<Vec<Option<u32>>>,
    pub journal: Option<Arc<Journal>>,
}

impl MockController {
    pub fn new(name: &'static str) -> MockController {
        MockController {
            name,
            hooks: DriverHooks::all() - DriverHooks::READ_PROP,
            probe_err: None,
            startup_err: None,
            probes: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            startups: AtomicUsize::new(0),
            wakes: AtomicUsize::new(0),
            payloads: Mutex::new(vec![]),
            journal: None,
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

impl MasterDriver for MockController {
    fn name(&self) -> &str {
        self.name
    }

    fn hooks(&self) -> DriverHooks {
        self.hooks
    }

    fn probe(&self, _master: &Master, payload: Option<&Payload>) -> Result<(), DriverError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .lock()
            .unwrap()
            .push(payload.and_then(|p| p.downcast_ref::<u32>()).copied());
        self.probe_err.map_or(Ok(()), Err)
    }

    fn remove(&self, master: &Master) -> Result<(), DriverError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        note(&self.journal, "remove", master.dev_name());
        Ok(())
    }

    fn shutdown(&self, master: &Master) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        note(&self.journal, "shutdown", master.dev_name());
    }

    fn startup(&self, _master: &Master) -> Result<(), DriverError> {
        self.startups.fetch_add(1, Ordering::SeqCst);
        self.startup_err.map_or(Ok(()), Err)
    }

    fn process_wake_event(&self, _master: &Master) -> Result<(), DriverError> {
        self.wakes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A bus with one unbound controller on link 0.
pub fn bus_with_master() -> (Bus, Handle<Master>) {
    let bus = Bus::default();
    let master = bus
        .add_master(Master::new("test-master", 0).unwrap())
        .unwrap();
    (bus, master)
}

pub fn slave(master: &Handle<Master>, mfg: u16, part: u16) -> Slave {
    Slave::new(master, SlaveId::new(mfg, part)).unwrap()
}

/// Upcast helpers so tests can keep the concrete type for counters.
pub fn as_slave_driver(d: &Arc<MockCodec>) -> Arc<dyn SlaveDriver> {
    d.clone()
}

pub fn as_master_driver(d: &Arc<MockController>) -> Arc<dyn MasterDriver> {
    d.clone()
}
