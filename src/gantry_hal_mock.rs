use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::axis::AxisId;
use crate::gantry_hal::{Delay, GantryHal, HalError, HalResult, LinePair, OutputLine, RegisterBus, TouchPad};
use crate::touch_sampler::TouchSensor;

/// Untouched pads read well above any sane threshold.
pub const MOCK_IDLE_TOUCH_READING: u16 = 600;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum DirectionPin {
    A,
    B,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct LineId {
    pub axis: AxisId,
    pub pin: DirectionPin,
}

impl LineId {
    pub fn new(axis: AxisId, pin: DirectionPin) -> Self {
        Self { axis, pin }
    }
}

/// Which writes to a line fail.  A failed write leaves the line where it was.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum LineFault {
    FailSetHigh,
    FailSetLow,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum HardwareEvent {
    Line { line: LineId, high: bool },
    Registers { register: u8, data: Vec<u8> },
    Delay(Duration),
}

struct MockState {
    recording: bool,
    events: Vec<HardwareEvent>,
    levels: HashMap<LineId, bool>,
    both_high_violations: usize,
    registers: [u8; 256],
    fail_bus: bool,
    line_faults: HashMap<LineId, LineFault>,
    touch_values: [HalResult<u16>; TouchSensor::COUNT],
}

impl MockState {
    fn new(recording: bool) -> Self {
        Self {
            recording,
            events: Vec::new(),
            levels: HashMap::new(),
            both_high_violations: 0,
            registers: [0; 256],
            fail_bus: false,
            line_faults: HashMap::new(),
            touch_values: [(); TouchSensor::COUNT].map(|_| Ok(MOCK_IDLE_TOUCH_READING)),
        }
    }

    fn record(&mut self, event: HardwareEvent) {
        if self.recording {
            self.events.push(event);
        }
    }

    fn set_line(&mut self, line: LineId, high: bool) -> HalResult<()> {
        debug!("set_line: {line:?} high={high}");
        let fault = if high { LineFault::FailSetHigh } else { LineFault::FailSetLow };
        if self.line_faults.get(&line) == Some(&fault) {
            return Err(HalError::Io(format!("simulated fault driving {line:?} high={high}")));
        }
        self.levels.insert(line, high);
        self.record(HardwareEvent::Line { line, high });
        let partner = LineId::new(line.axis, match line.pin {
            DirectionPin::A => DirectionPin::B,
            DirectionPin::B => DirectionPin::A,
        });
        if high && self.levels.get(&partner).copied().unwrap_or(false) {
            self.both_high_violations += 1;
        }
        Ok(())
    }
}

/// In-memory hardware.  Clones share the same journal so tests can keep a handle after the
/// [GantryHal] has been moved into the controller.
///
/// The journal only grows while recording; [GantryHalMock::without_journal] is for long runs.
#[derive(Clone)]
pub struct GantryHalMock {
    state: Rc<RefCell<MockState>>,
}

impl Default for GantryHalMock {
    fn default() -> Self {
        Self::new()
    }
}

impl GantryHalMock {
    pub fn new() -> Self {
        Self { state: Rc::new(RefCell::new(MockState::new(true))) }
    }

    pub fn without_journal() -> Self {
        Self { state: Rc::new(RefCell::new(MockState::new(false))) }
    }

    /// Delays are recorded in the journal and return immediately.
    pub fn create_hal(&self) -> GantryHal {
        self.create_hal_with_delay(Rc::new(MockDelay { state: self.state.clone() }))
    }

    pub fn create_hal_with_delay(&self, delay: Rc<dyn Delay>) -> GantryHal {
        GantryHal {
            x_lines: self.line_pair(AxisId::X),
            y_lines: self.line_pair(AxisId::Y),
            z_lines: self.line_pair(AxisId::Z),
            touch_pads: TouchSensor::ALL.map(|sensor| {
                Box::new(MockTouchPad { sensor, state: self.state.clone() }) as Box<dyn TouchPad>
            }),
            servo_bus: Box::new(MockRegisterBus { state: self.state.clone() }),
            delay,
        }
    }

    fn line_pair(&self, axis: AxisId) -> LinePair {
        LinePair {
            a: Box::new(MockLine { id: LineId::new(axis, DirectionPin::A), state: self.state.clone() }),
            b: Box::new(MockLine { id: LineId::new(axis, DirectionPin::B), state: self.state.clone() }),
        }
    }

    pub fn events(&self) -> Vec<HardwareEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn is_high(&self, line: LineId) -> bool {
        self.state.borrow().levels.get(&line).copied().unwrap_or(false)
    }

    /// Number of times both direction lines of one motor were observed high together.
    pub fn both_high_violations(&self) -> usize {
        self.state.borrow().both_high_violations
    }

    pub fn register(&self, register: u8) -> u8 {
        self.state.borrow().registers[usize::from(register)]
    }

    pub fn set_touch(&self, sensor: TouchSensor, value: HalResult<u16>) {
        self.state.borrow_mut().touch_values[sensor.index()] = value;
    }

    pub fn set_bus_failure(&self, fail: bool) {
        self.state.borrow_mut().fail_bus = fail;
    }

    pub fn set_line_fault(&self, line: LineId, fault: Option<LineFault>) {
        let mut state = self.state.borrow_mut();
        match fault {
            Some(fault) => state.line_faults.insert(line, fault),
            None => state.line_faults.remove(&line),
        };
    }
}

struct MockLine {
    id: LineId,
    state: Rc<RefCell<MockState>>,
}

impl OutputLine for MockLine {
    fn set_high(&mut self) -> HalResult<()> {
        self.state.borrow_mut().set_line(self.id, true)
    }

    fn set_low(&mut self) -> HalResult<()> {
        self.state.borrow_mut().set_line(self.id, false)
    }
}

struct MockTouchPad {
    sensor: TouchSensor,
    state: Rc<RefCell<MockState>>,
}

impl TouchPad for MockTouchPad {
    fn read(&mut self) -> HalResult<u16> {
        self.state.borrow().touch_values[self.sensor.index()].clone()
    }
}

struct MockRegisterBus {
    state: Rc<RefCell<MockState>>,
}

impl RegisterBus for MockRegisterBus {
    fn read_register(&mut self, register: u8) -> HalResult<u8> {
        let state = self.state.borrow();
        if state.fail_bus {
            return Err(HalError::Io(format!("simulated bus fault reading 0x{register:02x}")));
        }
        Ok(state.registers[usize::from(register)])
    }

    fn write_registers(&mut self, register: u8, data: &[u8]) -> HalResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_bus {
            return Err(HalError::Io(format!("simulated bus fault writing 0x{register:02x}")));
        }
        debug!("write_registers: 0x{register:02x} <- {data:02x?}");
        for (offset, byte) in data.iter().enumerate() {
            let index = (usize::from(register) + offset) % state.registers.len();
            state.registers[index] = *byte;
        }
        state.record(HardwareEvent::Registers { register, data: data.to_vec() });
        Ok(())
    }
}

struct MockDelay {
    state: Rc<RefCell<MockState>>,
}

impl Delay for MockDelay {
    fn delay(&self, duration: Duration) {
        self.state.borrow_mut().record(HardwareEvent::Delay(duration));
    }
}
