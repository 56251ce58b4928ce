//! In-process stand-ins for the chip, the host platform and the RF front end.
//!
//! [`SimulatedBus`] models as much of a TCC353x as the control core can
//! observe: the register file with banked GPIO, the misc register groups,
//! the mail FIFO with a small firmware that answers commands, the command
//! DMA with its hardware CRC, and broadcast addressing across ganged chips.
//! Faults can be injected per chip.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tcc353x_protocol::mailbox::{command, decode_host_mail};
use tcc353x_protocol::{
    crc32_mpeg2, BoardTopology, DiversityRole, Mailbox, TuneRequest, CHIP_ID,
};

use crate::bus::{BusTarget, BusTransport, RfFrontEnd};
use crate::error::{BusError, DriverError};
use crate::options::ReceiverOptions;
use crate::platform::{BinarySemaphore, Platform, Semaphore};
use crate::regs::{self, op, MiscGroup};

/// DSP code version word reported by the simulated firmware: 1.0.43, 2014-07-21.
pub const SIM_CODE_VERSION: u32 = 0x102B_1CF5;

/// Program id the simulated chips report.
const SIM_PROGRAM_ID: u8 = 0x0B;

/// Strapped address of chip 0; chip `i` answers at `+ 2 * i`.
const FIRST_CHIP_ADDRESS: u8 = 0xA8;

const GPIO_BANKS: usize = 3;
const GPIO_REGISTERS: usize = 6;

/// Value XOR-ed into the DMA CRC of a chip with injected corruption.
const CRC_CORRUPTION: u32 = 0xDEAD_BEEF;

struct Chip {
    address: u8,
    chip_id: u8,
    registers: [u8; 256],
    gpio: [[u8; GPIO_REGISTERS]; GPIO_BANKS],
    misc: HashMap<(u8, u8), u32>,
    misc_log: Vec<(u8, u8)>,
    mail_in: Vec<u8>,
    mail_out: VecDeque<u8>,
    mail_log: Vec<(u16, Vec<u32>)>,
    code: Vec<u8>,
    op_status: [u8; regs::OP_STATUS_SIZE],
    tmcc: [u32; 4],
    pll_updates: u32,
    dsp_resets: u32,
    corrupt_crc: bool,
    stuck_stop_ack: bool,
    nack: bool,
}

impl Chip {
    fn new(address: u8) -> Self {
        Self {
            address,
            chip_id: CHIP_ID,
            registers: [0; 256],
            gpio: [[0; GPIO_REGISTERS]; GPIO_BANKS],
            misc: HashMap::new(),
            misc_log: Vec::new(),
            mail_in: Vec::new(),
            mail_out: VecDeque::new(),
            mail_log: Vec::new(),
            code: Vec::new(),
            op_status: [0; regs::OP_STATUS_SIZE],
            tmcc: [0; 4],
            pll_updates: 0,
            dsp_resets: 0,
            corrupt_crc: false,
            stuck_stop_ack: false,
            nack: false,
        }
    }

    fn misc_group(&self) -> u8 {
        self.registers[regs::MISC_CTRL as usize] & regs::MISC_GROUP_MASK
    }

    fn gpio_slot(&self, register: u8) -> Option<(usize, usize)> {
        if (regs::GPIO_ALT..=regs::GPIO_SDRV).contains(&register) {
            let bank = (self.registers[regs::IO_CFG_MUX as usize] as usize).min(GPIO_BANKS - 1);
            Some((bank, (register - regs::GPIO_ALT) as usize))
        } else {
            None
        }
    }

    fn stop_acked(&self) -> bool {
        let cfg06 = self
            .misc
            .get(&(MiscGroup::Op as u8, op::CFG06))
            .copied()
            .unwrap_or(0);
        !self.stuck_stop_ack && cfg06 & op::CFG06_PAUSE != 0
    }

    fn dma_crc(&self) -> u32 {
        let crc = crc32_mpeg2(&self.code);
        if self.corrupt_crc {
            crc ^ CRC_CORRUPTION
        } else {
            crc
        }
    }

    /// Returns true when the write strobed a PLL update.
    fn write(&mut self, register: u8, data: &[u8]) -> bool {
        match register {
            regs::MAIL_FIFO_WIND => {
                self.mail_in.extend_from_slice(data);
                false
            }
            regs::CMDDMA_DATA_WIND => {
                self.code.extend_from_slice(data);
                false
            }
            regs::MISC_DATA => {
                self.write_misc(data);
                false
            }
            _ => {
                let mut pll_update = false;
                for (i, value) in data.iter().enumerate() {
                    pll_update |= self.write_register(register.wrapping_add(i as u8), *value);
                }
                pll_update
            }
        }
    }

    fn write_misc(&mut self, data: &[u8]) {
        let ctrl = self.registers[regs::MISC_CTRL as usize];
        if ctrl & regs::MISC_WRITE == 0 {
            return;
        }
        let group = self.misc_group();
        for word in data.chunks_exact(4) {
            let address = self.registers[regs::MISC_ADDR as usize];
            let value = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
            self.misc.insert((group, address), value);
            self.misc_log.push((group, address));
            if ctrl & regs::MISC_AUTO_INCREMENT != 0 {
                self.registers[regs::MISC_ADDR as usize] = address.wrapping_add(1);
            }
        }
    }

    fn write_register(&mut self, register: u8, value: u8) -> bool {
        if let Some((bank, index)) = self.gpio_slot(register) {
            self.gpio[bank][index] = value;
            return false;
        }
        self.registers[register as usize] = value;

        match register {
            regs::MAIL_CTRL if value & regs::MAIL_CTRL_INIT != 0 => {
                self.mail_in.clear();
                self.mail_out.clear();
            }
            regs::MAIL_CTRL if value & regs::MAIL_CTRL_SET != 0 => self.run_firmware(),
            regs::CMDDMA_CTRL if value & regs::CMDDMA_INIT != 0 => self.code.clear(),
            regs::SYS_RESET if value & regs::SYS_RESET_DSP != 0 => self.dsp_resets += 1,
            regs::PLL_6 if value & regs::PLL_6_UPDATE != 0 => {
                self.pll_updates += 1;
                return true;
            }
            _ => {}
        }
        false
    }

    /// Answer the mail posted to the FIFO.
    fn run_firmware(&mut self) {
        let mail = std::mem::take(&mut self.mail_in);
        let (header, payload) = match decode_host_mail(&mail) {
            Ok(decoded) => decoded,
            Err(_) => return,
        };
        self.mail_log.push((header.command, payload.clone()));
        if !header.expects_reply {
            return;
        }

        let data = match header.command {
            command::SYS_ASM_VER => vec![SIM_CODE_VERSION],
            command::SYS_START => Vec::new(),
            command::TMCC_RESULT => self.tmcc.to_vec(),
            _ => payload,
        };
        let reply = Mailbox {
            command: header.command,
            status: 0,
            data,
        };
        if let Ok(encoded) = reply.encode() {
            self.mail_out.extend(encoded.iter());
        }
    }

    fn read(&mut self, register: u8, buf: &mut [u8]) {
        match register {
            regs::MAIL_FIFO_WIND => {
                for byte in buf.iter_mut() {
                    *byte = self.mail_out.pop_front().unwrap_or(0);
                }
            }
            regs::MISC_DATA => {
                let key = (self.misc_group(), self.registers[regs::MISC_ADDR as usize]);
                let value = self.misc.get(&key).copied().unwrap_or(0).to_be_bytes();
                fill(buf, &value);
            }
            regs::DMA_CRC32 => fill(buf, &self.dma_crc().to_be_bytes()),
            regs::OP_STATUS => fill(buf, &self.op_status),
            _ => {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = self.read_register(register.wrapping_add(i as u8));
                }
            }
        }
    }

    fn read_register(&self, register: u8) -> u8 {
        if let Some((bank, index)) = self.gpio_slot(register) {
            return self.gpio[bank][index];
        }
        match register {
            regs::CHIP_ID => self.chip_id,
            regs::PROGRAM_ID if self.stop_acked() => SIM_PROGRAM_ID | regs::PROGRAM_ID_STOP_ACK,
            regs::PROGRAM_ID => SIM_PROGRAM_ID,
            regs::MAIL_FIFO_W_STAT => regs::MAIL_FIFO_W_READY,
            regs::MAIL_FIFO_R_STAT => ((self.mail_out.len() / 4) as u8) & regs::MAIL_FIFO_COUNT_MASK,
            _ => self.registers[register as usize],
        }
    }
}

fn fill(buf: &mut [u8], source: &[u8]) {
    for (byte, value) in buf.iter_mut().zip(source.iter().chain(std::iter::repeat(&0))) {
        *byte = *value;
    }
}

struct BusState {
    chips: Vec<Chip>,
    write_count: usize,
    broadcast_writes: usize,
    pll_update_order: Vec<usize>,
}

/// Simulated bus with `chips` TCC353x devices attached.
pub struct SimulatedBus {
    state: Mutex<BusState>,
}

impl SimulatedBus {
    pub fn new(chips: usize) -> Self {
        let chips = (0..chips)
            .map(|i| Chip::new(FIRST_CHIP_ADDRESS + 2 * i as u8))
            .collect();
        Self {
            state: Mutex::new(BusState {
                chips,
                write_count: 0,
                broadcast_writes: 0,
                pll_update_order: Vec::new(),
            }),
        }
    }

    /// Attach options matching the simulated chip addresses for `topology`.
    pub fn slot_options(topology: BoardTopology) -> Vec<ReceiverOptions> {
        let count = topology.diversity_count();
        (0..count)
            .map(|slot| ReceiverOptions {
                address: FIRST_CHIP_ADDRESS + 2 * slot as u8,
                topology,
                role: match slot {
                    0 => DiversityRole::Master,
                    s if s == count - 1 => DiversityRole::Slave,
                    _ => DiversityRole::Mid,
                },
                ..Default::default()
            })
            .collect()
    }

    fn with_chip<T>(&self, chip: usize, f: impl FnOnce(&mut Chip) -> T) -> T {
        f(&mut self.state.lock().chips[chip])
    }

    // Fault injection

    pub fn set_chip_id(&self, chip: usize, id: u8) {
        self.with_chip(chip, |c| c.chip_id = id);
    }

    pub fn corrupt_crc(&self, chip: usize) {
        self.with_chip(chip, |c| c.corrupt_crc = true);
    }

    /// Keep the stop acknowledgment from ever being raised.
    pub fn set_stuck_stop_ack(&self, chip: usize, stuck: bool) {
        self.with_chip(chip, |c| c.stuck_stop_ack = stuck);
    }

    /// Make the chip stop acknowledging its address.
    pub fn set_nack(&self, chip: usize, nack: bool) {
        self.with_chip(chip, |c| c.nack = nack);
    }

    // Chip state

    pub fn register(&self, chip: usize, register: u8) -> u8 {
        self.with_chip(chip, |c| c.registers[register as usize])
    }

    pub fn set_register(&self, chip: usize, register: u8, value: u8) {
        self.with_chip(chip, |c| c.registers[register as usize] = value);
    }

    /// GPIO register `register` of `bank`.
    pub fn gpio(&self, chip: usize, bank: usize, register: u8) -> u8 {
        self.with_chip(chip, |c| c.gpio[bank][(register - regs::GPIO_ALT) as usize])
    }

    pub fn misc(&self, chip: usize, group: MiscGroup, address: u8) -> u32 {
        self.with_chip(chip, |c| {
            c.misc.get(&(group as u8, address)).copied().unwrap_or(0)
        })
    }

    pub fn set_misc(&self, chip: usize, group: MiscGroup, address: u8, value: u32) {
        self.with_chip(chip, |c| {
            c.misc.insert((group as u8, address), value);
        });
    }

    /// Addresses written in `group`, in order.
    pub fn misc_log(&self, chip: usize, group: MiscGroup) -> Vec<u8> {
        self.with_chip(chip, |c| {
            c.misc_log
                .iter()
                .filter(|(g, _)| *g == group as u8)
                .map(|(_, address)| *address)
                .collect()
        })
    }

    pub fn clear_misc_log(&self) {
        for chip in self.state.lock().chips.iter_mut() {
            chip.misc_log.clear();
        }
    }

    /// Mail received by the firmware as (command, payload).
    pub fn mail_log(&self, chip: usize) -> Vec<(u16, Vec<u32>)> {
        self.with_chip(chip, |c| c.mail_log.clone())
    }

    pub fn clear_mail_log(&self) {
        for chip in self.state.lock().chips.iter_mut() {
            chip.mail_log.clear();
        }
    }

    pub fn set_op_status(&self, chip: usize, block: &[u8]) {
        self.with_chip(chip, |c| fill(&mut c.op_status, block));
    }

    /// Words returned for the TMCC result command.
    pub fn set_tmcc(&self, chip: usize, words: [u32; 4]) {
        self.with_chip(chip, |c| c.tmcc = words);
    }

    /// Code received through the command DMA.
    pub fn code(&self, chip: usize) -> Vec<u8> {
        self.with_chip(chip, |c| c.code.clone())
    }

    pub fn dma_crc(&self, chip: usize) -> u32 {
        self.with_chip(chip, |c| c.dma_crc())
    }

    pub fn pll_updates(&self, chip: usize) -> u32 {
        self.with_chip(chip, |c| c.pll_updates)
    }

    /// Chips in the order their PLL update strobes arrived.
    pub fn pll_update_order(&self) -> Vec<usize> {
        self.state.lock().pll_update_order.clone()
    }

    pub fn dsp_resets(&self, chip: usize) -> u32 {
        self.with_chip(chip, |c| c.dsp_resets)
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().write_count
    }

    pub fn broadcast_writes(&self) -> usize {
        self.state.lock().broadcast_writes
    }
}

fn addressed(chip: &Chip, target: &BusTarget) -> bool {
    target.interface.wire_address(chip.address) == target.address
}

impl BusTransport for SimulatedBus {
    fn write(&self, target: &BusTarget, register: u8, data: &[u8]) -> Result<(), BusError> {
        let mut state = self.state.lock();
        state.write_count += 1;

        if target.is_broadcast() {
            state.broadcast_writes += 1;
            let mut updated = Vec::new();
            for (index, chip) in state.chips.iter_mut().enumerate() {
                if !chip.nack && chip.write(register, data) {
                    updated.push(index);
                }
            }
            state.pll_update_order.extend(updated);
            return Ok(());
        }

        let index = state
            .chips
            .iter()
            .position(|c| addressed(c, target) && !c.nack)
            .ok_or(BusError::Nack(target.address))?;
        if state.chips[index].write(register, data) {
            state.pll_update_order.push(index);
        }
        Ok(())
    }

    fn read(&self, target: &BusTarget, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        if target.is_broadcast() {
            return Err(BusError::Transfer(format!(
                "read of 0x{:02X} from broadcast address",
                register
            )));
        }
        let mut state = self.state.lock();
        let chip = state
            .chips
            .iter_mut()
            .find(|c| addressed(c, target) && !c.nack)
            .ok_or(BusError::Nack(target.address))?;
        chip.read(register, buf);
        Ok(())
    }
}

/// Semaphore activity recorded by [`SimPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemaphoreEvent {
    Create(String),
    Lock(String),
    Unlock(String),
    Delete(String),
}

struct RecordingSemaphore {
    inner: BinarySemaphore,
    events: Arc<Mutex<Vec<SemaphoreEvent>>>,
}

impl Semaphore for RecordingSemaphore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn lock(&self) {
        self.inner.lock();
        self.events
            .lock()
            .push(SemaphoreEvent::Lock(self.name().to_string()));
    }

    fn unlock(&self) {
        self.events
            .lock()
            .push(SemaphoreEvent::Unlock(self.name().to_string()));
        self.inner.unlock();
    }
}

/// Platform with a virtual millisecond clock and recorded semaphores.
#[derive(Default)]
pub struct SimPlatform {
    now_ms: AtomicU64,
    events: Arc<Mutex<Vec<SemaphoreEvent>>>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the lock/unlock events of semaphores whose name
    /// starts with `prefix`.
    pub fn take_events_matching(&self, prefix: &str) -> Vec<SemaphoreEvent> {
        let mut events = self.events.lock();
        let mut taken = Vec::new();
        events.retain(|event| match event {
            SemaphoreEvent::Lock(name) | SemaphoreEvent::Unlock(name)
                if name.starts_with(prefix) =>
            {
                taken.push(event.clone());
                false
            }
            _ => true,
        });
        taken
    }

    /// How many semaphores named `name` were created.
    pub fn created_matching(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, SemaphoreEvent::Create(n) if n == name))
            .count()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SemaphoreEvent::Delete(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Platform for SimPlatform {
    fn create_semaphore(&self, name: &str) -> Arc<dyn Semaphore> {
        self.events
            .lock()
            .push(SemaphoreEvent::Create(name.to_string()));
        Arc::new(RecordingSemaphore {
            inner: BinarySemaphore::new(name),
            events: self.events.clone(),
        })
    }

    fn delete_semaphore(&self, semaphore: &Arc<dyn Semaphore>) {
        self.events
            .lock()
            .push(SemaphoreEvent::Delete(semaphore.name().to_string()));
    }

    fn delay_ms(&self, ms: u32) {
        self.now_ms.fetch_add(ms as u64, Ordering::SeqCst);
    }

    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// One recorded RF tune call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfTuneCall {
    pub module: usize,
    pub slot: usize,
    pub frequency_khz: i32,
    pub bandwidth_khz: u32,
    pub osc_khz: u32,
    pub request: TuneRequest,
}

/// RF front end that records its calls.
#[derive(Default)]
pub struct SimRf {
    inits: Mutex<Vec<(usize, usize)>>,
    tunes: Mutex<Vec<RfTuneCall>>,
    fail_tunes: AtomicBool,
}

impl SimRf {
    pub fn inits(&self) -> Vec<(usize, usize)> {
        self.inits.lock().clone()
    }

    pub fn tunes(&self) -> Vec<RfTuneCall> {
        self.tunes.lock().clone()
    }

    /// Make every following tune call fail.
    pub fn set_fail_tunes(&self, fail: bool) {
        self.fail_tunes.store(fail, Ordering::SeqCst);
    }
}

impl RfFrontEnd for SimRf {
    fn init(&self, module: usize, slot: usize) -> Result<(), DriverError> {
        self.inits.lock().push((module, slot));
        Ok(())
    }

    fn tune(
        &self,
        module: usize,
        slot: usize,
        frequency_khz: i32,
        bandwidth_khz: u32,
        osc_khz: u32,
        request: &TuneRequest,
    ) -> Result<(), DriverError> {
        self.tunes.lock().push(RfTuneCall {
            module,
            slot,
            frequency_khz,
            bandwidth_khz,
            osc_khz,
            request: *request,
        });
        if self.fail_tunes.load(Ordering::SeqCst) {
            return Err(DriverError::RfFrontEnd(format!(
                "no lock at {} kHz",
                frequency_khz
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcc353x_protocol::mailbox::{decode_slave_mail, encode_host_mail};
    use tcc353x_protocol::CommandInterface;

    fn target(address: u8) -> BusTarget {
        BusTarget {
            module: 0,
            slot: 0,
            interface: CommandInterface::I2c,
            address,
        }
    }

    #[test]
    fn test_unknown_address_nacks() {
        let bus = SimulatedBus::new(1);
        let mut buf = [0u8; 1];
        assert_eq!(
            bus.read(&target(0x10), regs::CHIP_ID, &mut buf),
            Err(BusError::Nack(0x10))
        );
        bus.read(&target(0xA8), regs::CHIP_ID, &mut buf).unwrap();
        assert_eq!(buf[0], CHIP_ID);

        bus.set_nack(0, true);
        assert!(bus.write(&target(0xA8), regs::SYS_EN, &[0]).is_err());
    }

    #[test]
    fn test_firmware_answers_mail() {
        let bus = SimulatedBus::new(1);
        let t = target(0xA8);
        let mail = encode_host_mail(command::SYS_ASM_VER, &[], true).unwrap();
        bus.write(&t, regs::MAIL_FIFO_WIND, &mail).unwrap();
        bus.write(&t, regs::MAIL_CTRL, &[regs::MAIL_CTRL_SET]).unwrap();

        let mut count = [0u8; 1];
        bus.read(&t, regs::MAIL_FIFO_R_STAT, &mut count).unwrap();
        assert_eq!(count[0], 2);
        let mut reply = [0u8; 8];
        bus.read(&t, regs::MAIL_FIFO_WIND, &mut reply).unwrap();
        assert_eq!(decode_slave_mail(&reply).unwrap().word(0), SIM_CODE_VERSION);
    }

    #[test]
    fn test_gpio_registers_are_banked() {
        let bus = SimulatedBus::new(1);
        let t = target(0xA8);
        bus.write(&t, regs::IO_CFG_MUX, &[2]).unwrap();
        bus.write(&t, regs::GPIO_LR, &[0x40]).unwrap();
        bus.write(&t, regs::IO_CFG_MUX, &[0]).unwrap();

        let mut buf = [0u8; 1];
        bus.read(&t, regs::GPIO_LR, &mut buf).unwrap();
        assert_eq!(buf[0], 0);
        assert_eq!(bus.gpio(0, 2, regs::GPIO_LR), 0x40);
    }

    #[test]
    fn test_platform_clock_and_events() {
        let platform = SimPlatform::new();
        platform.delay_ms(5);
        assert_eq!(platform.now_ms(), 5);

        let sem = platform.create_semaphore("Test0");
        sem.lock();
        sem.unlock();
        platform.delete_semaphore(&sem);
        assert_eq!(
            platform.take_events_matching("Test"),
            vec![
                SemaphoreEvent::Lock("Test0".into()),
                SemaphoreEvent::Unlock("Test0".into())
            ]
        );
        assert_eq!(platform.created_matching("Test0"), 1);
        assert_eq!(platform.deleted(), vec!["Test0".to_string()]);
    }
}
