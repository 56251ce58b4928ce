//! Session and handle registry.
//!
//! A [`Registry`] owns the attach state of every module it drives. Each
//! attached module gets a [`ModuleSession`] holding one [`ReceiverHandle`]
//! and two semaphores per diversity slot:
//!
//! - the mailbox lock serializes command-channel traffic to that chip;
//! - the op lock is held around anything that disables, resets or
//!   re-enables the chip's subsystems.
//!
//! A single interface lock, created with the registry, is shared by every
//! module. Multi-slot lock sets are always taken from the highest slot down
//! to slot 0 and released in the opposite order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info};
use parking_lot::{Mutex, MutexGuard, RwLock};
use tcc353x_protocol::{CommandInterface, CHIP_ID, MAX_DIVERSITY, MAX_MODULES};

use crate::bus::{BusTransport, RfFrontEnd};
use crate::channel::{BestEffort, CommandChannel};
use crate::error::DriverError;
use crate::handle::{ReceiverHandle, TuneState};
use crate::options::{DriverConfig, ReceiverOptions};
use crate::platform::{Platform, Semaphore, SemaphoreGuard, SlotLockSet};
use crate::regs;

/// Locks and state of one diversity slot.
pub(crate) struct SlotState {
    pub(crate) index: usize,
    pub(crate) handle: Mutex<ReceiverHandle>,
    pub(crate) mailbox_lock: Arc<dyn Semaphore>,
    pub(crate) op_lock: Arc<dyn Semaphore>,
}

/// An attached module and its diversity slots.
pub(crate) struct ModuleSession {
    pub(crate) module: usize,
    pub(crate) slots: Vec<SlotState>,
    attached: AtomicBool,
    state: Mutex<TuneState>,
}

impl ModuleSession {
    pub(crate) fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    pub(crate) fn diversity_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, slot: usize) -> Result<&SlotState, DriverError> {
        self.slots.get(slot).ok_or(DriverError::InvalidSlot {
            module: self.module,
            slot,
        })
    }

    /// Handle of `slot`. Must not be held across a bus transfer.
    pub(crate) fn handle(&self, slot: usize) -> MutexGuard<'_, ReceiverHandle> {
        self.slots[slot].handle.lock()
    }

    pub(crate) fn master(&self) -> MutexGuard<'_, ReceiverHandle> {
        self.handle(0)
    }

    /// Take every slot's op lock, highest slot first.
    pub(crate) fn lock_all_ops(&self) -> SlotLockSet<'_> {
        let locks: Vec<&dyn Semaphore> = self.slots.iter().map(|s| s.op_lock.as_ref()).collect();
        SlotLockSet::acquire(&locks)
    }

    pub(crate) fn state(&self) -> TuneState {
        *self.state.lock()
    }

    pub(crate) fn set_state(&self, state: TuneState) {
        let mut current = self.state.lock();
        if *current != state {
            debug!("[{}] {:?} -> {:?}", self.module, *current, state);
            *current = state;
        }
    }

    /// Slot indices from the highest down to 0.
    pub(crate) fn descending(&self) -> impl Iterator<Item = usize> {
        (0..self.slots.len()).rev()
    }
}

/// Owns attach state for up to [`MAX_MODULES`] modules.
pub struct Registry {
    pub(crate) bus: Arc<dyn BusTransport>,
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) rf: Arc<dyn RfFrontEnd>,
    pub(crate) config: DriverConfig,
    pub(crate) interface_lock: Arc<dyn Semaphore>,
    modules: [RwLock<Option<Arc<ModuleSession>>>; MAX_MODULES],
}

impl Registry {
    pub fn new(
        bus: Arc<dyn BusTransport>,
        platform: Arc<dyn Platform>,
        rf: Arc<dyn RfFrontEnd>,
        config: DriverConfig,
    ) -> Self {
        let interface_lock = platform.create_semaphore("InterfaceSemaphore");
        Self {
            bus,
            platform,
            rf,
            config,
            interface_lock,
            modules: std::array::from_fn(|_| RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Attached session of `module`.
    pub(crate) fn session(&self, module: usize) -> Result<Arc<ModuleSession>, DriverError> {
        let entry = self
            .modules
            .get(module)
            .ok_or(DriverError::InvalidModule(module))?;
        match entry.read().as_ref() {
            Some(session) if session.is_attached() => Ok(session.clone()),
            _ => Err(DriverError::NotAttached(module)),
        }
    }

    pub(crate) fn channel<'a>(
        &'a self,
        session: &'a ModuleSession,
        slot: usize,
    ) -> CommandChannel<'a> {
        CommandChannel::new(
            self.bus.as_ref(),
            self.platform.as_ref(),
            &self.config,
            session,
            &session.slots[slot],
        )
    }

    /// Attach `module` with one options entry per diversity slot.
    ///
    /// The diversity count comes from slot 0's board topology. Every chip must
    /// identify as a TCC353x; otherwise the session is torn down again.
    pub fn attach(&self, module: usize, options: &[ReceiverOptions]) -> Result<(), DriverError> {
        let entry = self
            .modules
            .get(module)
            .ok_or(DriverError::InvalidModule(module))?;
        let mut entry = entry.write();
        if entry.is_some() {
            return Err(DriverError::AlreadyAttached(module));
        }

        let first = options
            .first()
            .ok_or_else(|| DriverError::InvalidOptions("no slot options".to_string()))?;
        let count = first.topology.diversity_count();
        if count > MAX_DIVERSITY || options.len() < count {
            return Err(DriverError::InvalidOptions(format!(
                "{:?} needs {} slot options, got {}",
                first.topology,
                count,
                options.len()
            )));
        }
        if first.interface == CommandInterface::Unsupported {
            error!(
                "[{}] Unsupported command interface, keeping configured addresses",
                module
            );
        }

        let slots = options[..count]
            .iter()
            .enumerate()
            .map(|(slot, slot_options)| {
                let mut slot_options = slot_options.clone();
                // One bus flavour per module
                slot_options.interface = first.interface;
                SlotState {
                    index: slot,
                    handle: Mutex::new(ReceiverHandle::new(module, slot, slot_options)),
                    mailbox_lock: self
                        .platform
                        .create_semaphore(&format!("MailboxSemaphore{}{}", module, slot)),
                    op_lock: self
                        .platform
                        .create_semaphore(&format!("OpMailboxSemaphore{}{}", module, slot)),
                }
            })
            .collect();

        let session = Arc::new(ModuleSession {
            module,
            slots,
            attached: AtomicBool::new(true),
            state: Mutex::new(TuneState::Idle),
        });

        if let Err(e) = self.identify(&session) {
            session.attached.store(false, Ordering::SeqCst);
            self.retire_semaphores(&session);
            return Err(e);
        }

        info!(
            "[{}] Attached ({:?}, {} slot(s))",
            module, first.topology, count
        );
        *entry = Some(session);
        Ok(())
    }

    fn identify(&self, session: &ModuleSession) -> Result<(), DriverError> {
        let _ops = session.lock_all_ops();
        for slot in 0..session.diversity_count() {
            let channel = self.channel(session, slot);
            let chip_id = channel.read_u8(regs::CHIP_ID)?;
            let program_id = channel
                .read_u8(regs::PROGRAM_ID)
                .or_warn(format_args!("[{}:{}] Program id read", session.module, slot))
                .unwrap_or(0);
            info!(
                "[{}:{}] Chip id 0x{:02X}, program id 0x{:02X}",
                session.module, slot, chip_id, program_id
            );
            if chip_id != CHIP_ID {
                return Err(DriverError::ChipIdMismatch {
                    expected: CHIP_ID,
                    found: chip_id,
                });
            }
        }
        Ok(())
    }

    fn retire_semaphores(&self, session: &ModuleSession) {
        for slot in &session.slots {
            self.platform.delete_semaphore(&slot.mailbox_lock);
            self.platform.delete_semaphore(&slot.op_lock);
        }
    }

    /// Detach `module`, retiring its handles and semaphores.
    ///
    /// Operations still holding the session observe it as detached and fail
    /// with [`DriverError::NotAttached`].
    pub fn detach(&self, module: usize) -> Result<(), DriverError> {
        let entry = self
            .modules
            .get(module)
            .ok_or(DriverError::InvalidModule(module))?;
        let session = entry.write().take().ok_or(DriverError::NotAttached(module))?;

        {
            let _interface = SemaphoreGuard::acquire(self.interface_lock.as_ref());
            let _ops = session.lock_all_ops();
            session.attached.store(false, Ordering::SeqCst);
            session.set_state(TuneState::Idle);
        }
        self.retire_semaphores(&session);

        info!("[{}] Detached", module);
        Ok(())
    }

    /// Quiesce interrupts and stream outputs, then detach.
    pub fn close(&self, module: usize) -> Result<(), DriverError> {
        let session = self.session(module)?;

        if session.master().options.use_interrupt {
            let channel = self.channel(&session, 0);
            channel
                .write_u8(regs::IRQ_EN, 0)
                .or_warn(format_args!("[{}:0] Interrupt disable", module));
            channel
                .write_u8(regs::IRQ_STAT_CLR, regs::IRQ_STAT_CLR_ALL)
                .or_warn(format_args!("[{}:0] Interrupt clear", module));
        }
        for slot in 0..session.diversity_count() {
            self.peripheral_on_off(&session, slot, false);
        }

        self.detach(module)
    }

    pub fn is_attached(&self, module: usize) -> bool {
        self.session(module).is_ok()
    }

    pub fn diversity_count(&self, module: usize) -> Result<usize, DriverError> {
        Ok(self.session(module)?.diversity_count())
    }

    /// Snapshot of one slot's handle.
    pub fn handle(&self, module: usize, slot: usize) -> Result<ReceiverHandle, DriverError> {
        let session = self.session(module)?;
        let state = session.slot(slot)?;
        let handle = state.handle.lock().clone();
        Ok(handle)
    }

    pub fn tune_state(&self, module: usize) -> Result<TuneState, DriverError> {
        Ok(self.session(module)?.state())
    }

    /// Turn the stream peripheral of `slot` on or off.
    pub(crate) fn peripheral_on_off(&self, session: &ModuleSession, slot: usize, on: bool) {
        let config = session.handle(slot).options.registers.peri_config[0];
        let mut value = config | regs::PERI_INIT_AUTOCLR;
        if on {
            value |= regs::PERI_EN;
        }
        self.channel(session, slot)
            .write_u8(regs::PERI_CFG0, value)
            .or_warn(format_args!("[{}:{}] Peripheral on/off", session.module, slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SemaphoreEvent, SimPlatform, SimRf, SimulatedBus};
    use tcc353x_protocol::BoardTopology;

    fn registry(bus: Arc<SimulatedBus>, platform: Arc<SimPlatform>) -> Registry {
        Registry::new(bus, platform, Arc::new(SimRf::default()), DriverConfig::default())
    }

    fn two_slot_options() -> Vec<ReceiverOptions> {
        SimulatedBus::slot_options(BoardTopology::TwoDiversity)
    }

    #[test]
    fn test_attach_and_detach() {
        let bus = Arc::new(SimulatedBus::new(2));
        let platform = Arc::new(SimPlatform::new());
        let registry = registry(bus, platform);

        registry.attach(0, &two_slot_options()).unwrap();
        assert!(registry.is_attached(0));
        assert_eq!(registry.diversity_count(0).unwrap(), 2);
        assert_eq!(
            registry.attach(0, &two_slot_options()),
            Err(DriverError::AlreadyAttached(0))
        );

        registry.detach(0).unwrap();
        assert!(!registry.is_attached(0));
        assert_eq!(registry.detach(0), Err(DriverError::NotAttached(0)));
        assert_eq!(
            registry.handle(0, 0).unwrap_err().code(),
            tcc353x_protocol::ResultCode::FailInvalidHandle
        );
    }

    #[test]
    fn test_invalid_module_and_slot() {
        let bus = Arc::new(SimulatedBus::new(1));
        let registry = registry(bus, Arc::new(SimPlatform::new()));
        assert_eq!(
            registry.attach(MAX_MODULES, &[ReceiverOptions::default()]),
            Err(DriverError::InvalidModule(MAX_MODULES))
        );

        registry.attach(1, &[ReceiverOptions::default()]).unwrap();
        assert_eq!(
            registry.handle(1, 1).unwrap_err(),
            DriverError::InvalidSlot { module: 1, slot: 1 }
        );
    }

    #[test]
    fn test_attach_rejects_short_options() {
        let bus = Arc::new(SimulatedBus::new(2));
        let registry = registry(bus, Arc::new(SimPlatform::new()));
        let options = vec![ReceiverOptions {
            topology: BoardTopology::TwoDiversity,
            ..Default::default()
        }];
        assert!(matches!(
            registry.attach(0, &options),
            Err(DriverError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_chip_id_mismatch_tears_down() {
        let bus = Arc::new(SimulatedBus::new(2));
        bus.set_chip_id(1, 0x31);
        let platform = Arc::new(SimPlatform::new());
        let registry = registry(bus, platform.clone());

        assert_eq!(
            registry.attach(0, &two_slot_options()),
            Err(DriverError::ChipIdMismatch {
                expected: 0x33,
                found: 0x31
            })
        );
        assert!(!registry.is_attached(0));
        assert_eq!(platform.deleted().len(), 4);
    }

    #[test]
    fn test_attach_detach_lock_order() {
        let bus = Arc::new(SimulatedBus::new(2));
        let platform = Arc::new(SimPlatform::new());
        let registry = registry(bus, platform.clone());

        registry.attach(0, &two_slot_options()).unwrap();
        let ops: Vec<SemaphoreEvent> = platform.take_events_matching("OpMailboxSemaphore");
        assert_eq!(
            ops,
            vec![
                SemaphoreEvent::Lock("OpMailboxSemaphore01".into()),
                SemaphoreEvent::Lock("OpMailboxSemaphore00".into()),
                SemaphoreEvent::Unlock("OpMailboxSemaphore00".into()),
                SemaphoreEvent::Unlock("OpMailboxSemaphore01".into()),
            ]
        );

        registry.detach(0).unwrap();
        let ops = platform.take_events_matching("OpMailboxSemaphore");
        assert_eq!(
            ops,
            vec![
                SemaphoreEvent::Lock("OpMailboxSemaphore01".into()),
                SemaphoreEvent::Lock("OpMailboxSemaphore00".into()),
                SemaphoreEvent::Unlock("OpMailboxSemaphore00".into()),
                SemaphoreEvent::Unlock("OpMailboxSemaphore01".into()),
            ]
        );
        assert_eq!(platform.deleted().len(), 4);
    }

    #[test]
    fn test_interface_lock_shared_across_modules() {
        let bus = Arc::new(SimulatedBus::new(1));
        let platform = Arc::new(SimPlatform::new());
        let registry = registry(bus, platform.clone());

        registry.attach(0, &[ReceiverOptions::default()]).unwrap();
        registry.attach(1, &[ReceiverOptions::default()]).unwrap();
        registry.detach(0).unwrap();
        registry.detach(1).unwrap();

        assert_eq!(platform.created_matching("InterfaceSemaphore"), 1);
    }

    #[test]
    fn test_close_turns_peripheral_off() {
        let bus = Arc::new(SimulatedBus::new(2));
        let registry = registry(bus.clone(), Arc::new(SimPlatform::new()));
        registry.attach(0, &two_slot_options()).unwrap();

        registry.close(0).unwrap();
        assert!(!registry.is_attached(0));
        for slot in 0..2 {
            assert_eq!(bus.register(slot, regs::PERI_CFG0) & regs::PERI_EN, 0);
            assert_ne!(bus.register(slot, regs::PERI_CFG0) & regs::PERI_INIT_AUTOCLR, 0);
        }
    }
}
