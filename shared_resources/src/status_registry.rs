use parking_lot::RwLock;

use crate::elevator_message::ElevatorStatus;
use crate::error::RegistryError;

/// One status slot per car. Slots are read and replaced independently, so a
/// reader never waits on more than one car's writer.
#[derive(Debug)]
pub struct StatusRegistry {
    slots: Vec<RwLock<ElevatorStatus>>,
}

impl StatusRegistry {
    pub fn new(num_elevators: u8) -> Self {
        StatusRegistry {
            slots: (1..=num_elevators)
                .map(|id| RwLock::new(ElevatorStatus::new(id)))
                .collect(),
        }
    }

    pub fn replace(&self, status: ElevatorStatus) -> Result<(), RegistryError> {
        let slot = self.slot(status.elevator_id)?;
        *slot.write() = status;
        Ok(())
    }

    /// Per-slot consistent copy of every car, ordered by id.
    pub fn snapshot(&self) -> Vec<ElevatorStatus> {
        self.slots.iter().map(|slot| slot.read().clone()).collect()
    }

    pub fn num_elevators(&self) -> u8 {
        self.slots.len() as u8
    }

    fn slot(&self, elevator_id: u8) -> Result<&RwLock<ElevatorStatus>, RegistryError> {
        let unknown = RegistryError::UnknownElevator {
            id: elevator_id,
            num_elevators: self.num_elevators(),
        };
        if elevator_id == 0 {
            return Err(unknown);
        }
        self.slots.get(elevator_id as usize - 1).ok_or(unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::elevator_message::ElevatorStateKind;

    #[test]
    fn starts_with_every_car_idle_on_the_ground_floor() {
        let registry = StatusRegistry::new(3);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 3);
        for (i, status) in snapshot.iter().enumerate() {
            assert_eq!(status.elevator_id, i as u8 + 1);
            assert_eq!(status.floor, 1);
            assert_eq!(status.direction, Direction::Idle);
        }
    }

    #[test]
    fn replace_only_touches_its_own_slot() {
        let registry = StatusRegistry::new(2);
        let status = ElevatorStatus {
            elevator_id: 2,
            floor: 7,
            direction: Direction::Up,
            state: ElevatorStateKind::MovingUp,
            fault: None,
        };
        registry.replace(status.clone()).unwrap();
        assert_eq!(registry.snapshot(), vec![ElevatorStatus::new(1), status]);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let registry = StatusRegistry::new(2);
        assert_eq!(
            registry.replace(ElevatorStatus::new(3)),
            Err(RegistryError::UnknownElevator { id: 3, num_elevators: 2 })
        );
        let mut unnumbered = ElevatorStatus::new(1);
        unnumbered.elevator_id = 0;
        assert!(registry.replace(unnumbered).is_err());
    }
}
