use std::io::{stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand, Result};

use shared_resources::elevator_message::ElevatorStatus;
use shared_resources::status_table;

use super::state::DispatcherState;

/// Dispatcher block drawn above the car table.
const HEADER_SIZE: u16 = 5;

/// Dispatcher view of the building: its own state and every car's last report.
pub struct Debug {
    stdout: Stdout,
    num_elevators: u8,
    drawn: bool,
}

impl Debug {
    pub fn new(num_elevators: u8) -> Self {
        Debug {
            stdout: stdout(),
            num_elevators,
            drawn: false,
        }
    }

    pub fn printstatus(
        &mut self,
        state: DispatcherState,
        num_pending: usize,
        statuses: &[ElevatorStatus],
    ) -> Result<()> {
        if self.drawn {
            self.stdout.execute(cursor::MoveUp(HEADER_SIZE + status_table::height(self.num_elevators as usize)))?;
            self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        self.drawn = true;

        writeln!(self.stdout, "+-------------------------+")?;
        writeln!(self.stdout, "| DISPATCHER              |")?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "STATE", state)?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "PENDING", num_pending)?;
        let shown = statuses.len().min(self.num_elevators as usize);
        status_table::write_table(&mut self.stdout, &statuses[..shown])?;
        self.stdout.flush()?;

        Ok(())
    }
}
