use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;

use crate::direction::Direction;
use crate::error::RequestParseError;

const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Fault a passenger request injects into the car that boards it.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ElevatorStuck,
    DoorsStuck,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::ElevatorStuck => f.write_str("ELEVATOR_STUCK"),
            Fault::DoorsStuck => f.write_str("DOORS_STUCK"),
        }
    }
}

impl FromStr for Fault {
    type Err = RequestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ELEVATOR_STUCK" => Ok(Fault::ElevatorStuck),
            "DOORS_STUCK" => Ok(Fault::DoorsStuck),
            other => Err(RequestParseError::UnknownFault(other.to_string())),
        }
    }
}

/// A passenger call: where it was made, which way it is going and where it ends.
///
/// Two requests are equal when timestamp, floors and direction match; the fault
/// tag does not take part in equality.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct ElevatorRequest {
    timestamp: NaiveTime,
    source_floor: u8,
    direction: Direction,
    destination_floor: u8,
    fault: Option<Fault>,
}

impl ElevatorRequest {
    pub fn new(
        timestamp: NaiveTime,
        source_floor: u8,
        direction: Direction,
        destination_floor: u8,
    ) -> Self {
        ElevatorRequest {
            timestamp,
            source_floor,
            direction,
            destination_floor,
            fault: None,
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn timestamp(&self) -> NaiveTime {
        self.timestamp
    }

    pub fn source_floor(&self) -> u8 {
        self.source_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn destination_floor(&self) -> u8 {
        self.destination_floor
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Copy of this request with the fault tag removed, used once a fault has
    /// been dealt with.
    pub fn without_fault(&self) -> Self {
        ElevatorRequest {
            fault: None,
            ..self.clone()
        }
    }

    /// Rejects requests the shaft cannot serve.
    pub fn check_floors(&self, num_floors: u8) -> Result<(), RequestParseError> {
        for floor in [self.source_floor, self.destination_floor] {
            if floor < 1 || floor > num_floors {
                return Err(RequestParseError::FloorOutOfRange { floor, num_floors });
            }
        }
        if self.source_floor == self.destination_floor {
            return Err(RequestParseError::SameFloor(self.source_floor));
        }
        Ok(())
    }
}

impl PartialEq for ElevatorRequest {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.source_floor == other.source_floor
            && self.direction == other.direction
            && self.destination_floor == other.destination_floor
    }
}

impl Eq for ElevatorRequest {}

impl fmt::Display for ElevatorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.source_floor,
            self.direction,
            self.destination_floor,
        )?;
        if let Some(fault) = self.fault {
            write!(f, " {}", fault)?;
        }
        Ok(())
    }
}

impl FromStr for ElevatorRequest {
    type Err = RequestParseError;

    /// Parses `hh:mm:ss.SSS <source> <UP|DOWN> <destination> [FAULT]`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 && fields.len() != 5 {
            return Err(RequestParseError::FieldCount(fields.len()));
        }

        let timestamp = NaiveTime::parse_from_str(fields[0], "%H:%M:%S%.f")
            .map_err(|_| RequestParseError::Timestamp(fields[0].to_string()))?;
        let source_floor = parse_floor(fields[1])?;
        let direction = match fields[2] {
            "UP" => Direction::Up,
            "DOWN" => Direction::Down,
            other => return Err(RequestParseError::Direction(other.to_string())),
        };
        let destination_floor = parse_floor(fields[3])?;

        let mut request = ElevatorRequest::new(timestamp, source_floor, direction, destination_floor);
        if let Some(tag) = fields.get(4) {
            request = request.with_fault(tag.parse()?);
        }
        Ok(request)
    }
}

fn parse_floor(field: &str) -> Result<u8, RequestParseError> {
    field
        .parse::<u8>()
        .map_err(|_| RequestParseError::Floor(field.to_string()))
}
