/// ----- STATUS TABLE -----
/// Text table of car statuses shared by the elevator and dispatcher consoles.

use std::io::{self, Write};

use crate::elevator_message::ElevatorStatus;

const BORDER: &str = "+------------+------------+------------+--------------+----------------+";

/// Lines taken by a table of `num_rows` cars: header block, rows and the closing border.
pub fn height(num_rows: usize) -> u16 {
    (4 + num_rows) as u16
}

pub fn write_table<W: Write>(out: &mut W, statuses: &[ElevatorStatus]) -> io::Result<()> {
    writeln!(out, "{}", BORDER)?;
    write_line(out, "ELEVATOR", "FLOOR", "DIRECTION", "STATE", "FAULT")?;
    writeln!(out, "{}", BORDER)?;
    for status in statuses {
        let fault = status.fault.map(|fault| fault.to_string()).unwrap_or_default();
        write_line(
            out,
            &status.elevator_id.to_string(),
            &status.floor.to_string(),
            &status.direction.as_string(),
            &status.state.as_string(),
            &fault,
        )?;
    }
    writeln!(out, "{}", BORDER)
}

fn write_line<W: Write>(
    out: &mut W,
    elevator: &str,
    floor: &str,
    direction: &str,
    state: &str,
    fault: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "| {0:<10} | {1:<10} | {2:<10} | {3:<12} | {4:<14} |",
        elevator, floor, direction, state, fault
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::elevator_message::ElevatorStateKind;
    use crate::request::Fault;

    #[test]
    fn one_line_per_car_between_borders() {
        let mut stuck = ElevatorStatus::new(2);
        stuck.floor = 7;
        stuck.direction = Direction::Up;
        stuck.state = ElevatorStateKind::ElevatorStuck;
        stuck.fault = Some(Fault::ElevatorStuck);
        let statuses = [ElevatorStatus::new(1), stuck];

        let mut out = Vec::new();
        write_table(&mut out, &statuses).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), height(statuses.len()) as usize);
        assert_eq!(lines[0], BORDER);
        assert_eq!(lines[2], BORDER);
        assert_eq!(lines[5], BORDER);
        assert!(lines[1].contains("ELEVATOR"));
        assert!(lines[3].starts_with("| 1 "));
        assert!(lines[4].contains("| 7 "));
        assert!(lines[4].contains("stuck"));
        assert!(lines[4].contains("ELEVATOR_STUCK"));
        assert!(lines.iter().all(|line| line.len() == BORDER.len()));
    }
}
