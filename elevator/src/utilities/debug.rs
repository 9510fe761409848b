use std::io::{stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand, Result};

use shared_resources::elevator_message::ElevatorStatus;
use shared_resources::status_table;

/// Status table of every car in this subsystem, redrawn in place.
pub struct Debug {
    stdout: Stdout,
    statuses: Vec<ElevatorStatus>,
    drawn: bool,
}

impl Debug {
    pub fn new(num_elevators: u8) -> Self {
        Debug {
            stdout: stdout(),
            statuses: (1..=num_elevators).map(ElevatorStatus::new).collect(),
            drawn: false,
        }
    }

    pub fn printstatus(&mut self, status: &ElevatorStatus) -> Result<()> {
        if let Some(slot) = self
            .statuses
            .iter_mut()
            .find(|slot| slot.elevator_id == status.elevator_id)
        {
            *slot = status.clone();
        }

        if self.drawn {
            self.stdout.execute(cursor::MoveUp(self.size()))?;
            self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        self.drawn = true;

        status_table::write_table(&mut self.stdout, &self.statuses)?;
        self.stdout.flush()?;

        Ok(())
    }

    fn size(&self) -> u16 {
        status_table::height(self.statuses.len())
    }
}
