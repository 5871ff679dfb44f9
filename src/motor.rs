use crate::gantry_hal::{HalResult, LinePair};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum MotorCommand {
    Forward,
    Reverse,
    Stop,
}

/// A DC motor behind an H-bridge, driven purely by its two direction lines.  There is no
/// feedback; the only state is the last command sent.
pub struct Motor {
    lines: LinePair,
    command: MotorCommand,
}

impl Motor {
    pub fn new(lines: LinePair) -> HalResult<Self> {
        let mut me = Self { lines, command: MotorCommand::Stop };
        me.stop()?;
        Ok(me)
    }

    /// On failure the command reflects what the lines were last driven to: unchanged if the
    /// other line couldn't be released, [MotorCommand::Stop] if it was released but the
    /// asserted line didn't come up.
    pub fn drive(&mut self, forward: bool) -> HalResult<()> {
        let (asserted, released) = if forward {
            (&mut self.lines.a, &mut self.lines.b)
        } else {
            (&mut self.lines.b, &mut self.lines.a)
        };
        // Release first so both lines are never high at once.
        released.set_low()?;
        if let Err(e) = asserted.set_high() {
            self.command = MotorCommand::Stop;
            return Err(e);
        }
        self.command = if forward { MotorCommand::Forward } else { MotorCommand::Reverse };
        Ok(())
    }

    /// Drives both lines low, attempting the second even if the first fails.  The command only
    /// stays `Forward`/`Reverse` when its own line couldn't be lowered.
    pub fn stop(&mut self) -> HalResult<()> {
        let a = self.lines.a.set_low();
        let b = self.lines.b.set_low();
        self.command = match self.command {
            MotorCommand::Forward if a.is_err() => MotorCommand::Forward,
            MotorCommand::Reverse if b.is_err() => MotorCommand::Reverse,
            _ => MotorCommand::Stop,
        };
        a.and(b)
    }

    pub fn apply(&mut self, command: MotorCommand) -> HalResult<()> {
        match command {
            MotorCommand::Forward => self.drive(true),
            MotorCommand::Reverse => self.drive(false),
            MotorCommand::Stop => self.stop(),
        }
    }

    pub fn command(&self) -> MotorCommand {
        self.command
    }
}

#[cfg(test)]
mod tests {
    use crate::axis::AxisId;
    use crate::gantry_hal_mock::{DirectionPin, GantryHalMock, HardwareEvent, LineFault, LineId};

    use super::*;

    const A: LineId = LineId { axis: AxisId::X, pin: DirectionPin::A };
    const B: LineId = LineId { axis: AxisId::X, pin: DirectionPin::B };

    fn create_motor(mock: &GantryHalMock) -> Motor {
        Motor::new(mock.create_hal().x_lines).unwrap()
    }

    #[test]
    fn test_starts_stopped() {
        let mock = GantryHalMock::new();
        let motor = create_motor(&mock);
        assert_eq!(motor.command(), MotorCommand::Stop);
        assert!(!mock.is_high(A));
        assert!(!mock.is_high(B));
    }

    #[test]
    fn test_drive_asserts_exactly_one_line() {
        let mock = GantryHalMock::new();
        let mut motor = create_motor(&mock);

        motor.drive(true).unwrap();
        assert!(mock.is_high(A) && !mock.is_high(B));
        assert_eq!(motor.command(), MotorCommand::Forward);

        motor.drive(false).unwrap();
        assert!(!mock.is_high(A) && mock.is_high(B));
        assert_eq!(motor.command(), MotorCommand::Reverse);
    }

    #[test]
    fn test_never_both_lines_high() {
        let mock = GantryHalMock::new();
        let mut motor = create_motor(&mock);
        let commands = [
            MotorCommand::Forward,
            MotorCommand::Reverse,
            MotorCommand::Forward,
            MotorCommand::Stop,
            MotorCommand::Reverse,
            MotorCommand::Reverse,
            MotorCommand::Forward,
            MotorCommand::Stop,
        ];
        for command in commands {
            motor.apply(command).unwrap();
            assert!(!(mock.is_high(A) && mock.is_high(B)));
        }
        assert_eq!(mock.both_high_violations(), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mock = GantryHalMock::new();
        let mut motor = create_motor(&mock);
        motor.stop().unwrap();
        mock.clear_events();

        motor.stop().unwrap();
        assert_eq!(mock.events(), vec![
            HardwareEvent::Line { line: A, high: false },
            HardwareEvent::Line { line: B, high: false },
        ]);
        assert!(!mock.is_high(A));
        assert!(!mock.is_high(B));
        assert_eq!(motor.command(), MotorCommand::Stop);
    }

    #[test]
    fn test_stop_lowers_remaining_line_when_other_fails() {
        let mock = GantryHalMock::new();
        let mut motor = create_motor(&mock);
        motor.drive(false).unwrap();
        mock.set_line_fault(A, Some(LineFault::FailSetLow));

        assert!(motor.stop().is_err());
        assert!(!mock.is_high(B));
        assert_eq!(motor.command(), MotorCommand::Stop);
    }

    #[test]
    fn test_stop_keeps_command_while_its_line_is_stuck_high() {
        let mock = GantryHalMock::new();
        let mut motor = create_motor(&mock);
        motor.drive(true).unwrap();
        mock.set_line_fault(A, Some(LineFault::FailSetLow));

        assert!(motor.stop().is_err());
        assert!(mock.is_high(A));
        assert!(!mock.is_high(B));
        assert_eq!(motor.command(), MotorCommand::Forward);

        mock.set_line_fault(A, None);
        motor.stop().unwrap();
        assert!(!mock.is_high(A));
        assert_eq!(motor.command(), MotorCommand::Stop);
    }

    #[test]
    fn test_failed_assert_reports_stop() {
        let mock = GantryHalMock::new();
        let mut motor = create_motor(&mock);
        motor.drive(true).unwrap();
        mock.set_line_fault(B, Some(LineFault::FailSetHigh));

        assert!(motor.drive(false).is_err());
        assert!(!mock.is_high(A));
        assert!(!mock.is_high(B));
        assert_eq!(motor.command(), MotorCommand::Stop);
    }

    #[test]
    fn test_failed_release_keeps_command() {
        let mock = GantryHalMock::new();
        let mut motor = create_motor(&mock);
        motor.drive(true).unwrap();
        mock.set_line_fault(A, Some(LineFault::FailSetLow));

        assert!(motor.drive(false).is_err());
        assert!(mock.is_high(A));
        assert!(!mock.is_high(B));
        assert_eq!(motor.command(), MotorCommand::Forward);
        assert_eq!(mock.both_high_violations(), 0);
    }
}
