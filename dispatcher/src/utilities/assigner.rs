/// ----- REQUEST ASSIGNER -----
/// This stateless module decides which car serves which pending request. It
/// looks at the pending requests oldest first and prefers, in order: a car
/// already travelling toward the caller in the caller's direction, an idle
/// car, and finally a random car so that no request waits forever.

use rand::Rng;

use shared_resources::direction::Direction;
use shared_resources::elevator_message::{AssignedElevatorRequest, ElevatorStatus};
use shared_resources::request::ElevatorRequest;

/// Picks the next assignment. Returns the index of the chosen request in
/// `pending` together with the assignment, or `None` if nothing is pending.
pub fn find_best_assignment<R: Rng>(
    pending: &[ElevatorRequest],
    statuses: &[ElevatorStatus],
    num_elevators: u8,
    rng: &mut R,
) -> Option<(usize, AssignedElevatorRequest)> {
    let oldest = pending.first()?;

    for (index, request) in pending.iter().enumerate() {
        if let Some(elevator_id) = find_moving_elevator(statuses, request) {
            return Some((index, assign(elevator_id, request)));
        }
    }

    for (index, request) in pending.iter().enumerate() {
        if let Some(elevator_id) = find_idle_elevator(statuses, num_elevators, request) {
            return Some((index, assign(elevator_id, request)));
        }
    }

    let elevator_id = rng.gen_range(1..=num_elevators.max(1));
    Some((0, assign(elevator_id, oldest)))
}

/// Closest healthy car heading the request's way that has not passed it yet.
fn find_moving_elevator(statuses: &[ElevatorStatus], request: &ElevatorRequest) -> Option<u8> {
    let source = request.source_floor();
    let candidates = statuses.iter().filter(|status| {
        !status.is_faulted()
            && status.direction == request.direction()
            && match request.direction() {
                Direction::Up => status.floor <= source,
                Direction::Down => status.floor >= source,
                Direction::Idle => false,
            }
    });
    closest(candidates, source)
}

/// Car 1 while the whole fleet is idle, otherwise the closest idle car.
fn find_idle_elevator(
    statuses: &[ElevatorStatus],
    num_elevators: u8,
    request: &ElevatorRequest,
) -> Option<u8> {
    let idle: Vec<&ElevatorStatus> = statuses
        .iter()
        .filter(|status| status.direction == Direction::Idle && !status.is_faulted())
        .collect();
    if !idle.is_empty() && idle.len() == num_elevators as usize {
        return Some(1);
    }
    closest(idle.into_iter(), request.source_floor())
}

/// Ties go to the first candidate, which is the lowest id.
fn closest<'a>(candidates: impl Iterator<Item = &'a ElevatorStatus>, floor: u8) -> Option<u8> {
    candidates
        .min_by_key(|status| status.floor.abs_diff(floor))
        .map(|status| status.elevator_id)
}

fn assign(elevator_id: u8, request: &ElevatorRequest) -> AssignedElevatorRequest {
    AssignedElevatorRequest {
        elevator_id,
        request: request.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared_resources::elevator_message::ElevatorStateKind;
    use shared_resources::request::Fault;

    fn request(second: u32, src: u8, dir: Direction, dst: u8) -> ElevatorRequest {
        ElevatorRequest::new(NaiveTime::from_hms_opt(8, 0, second).unwrap(), src, dir, dst)
    }

    fn status(elevator_id: u8, floor: u8, direction: Direction) -> ElevatorStatus {
        let state = match direction {
            Direction::Up => ElevatorStateKind::MovingUp,
            Direction::Down => ElevatorStateKind::MovingDown,
            Direction::Idle => ElevatorStateKind::Idle,
        };
        ElevatorStatus {
            elevator_id,
            floor,
            direction,
            state,
            fault: None,
        }
    }

    fn assigned_to(
        pending: &[ElevatorRequest],
        statuses: &[ElevatorStatus],
    ) -> Option<(usize, u8)> {
        let mut rng = StdRng::seed_from_u64(1);
        find_best_assignment(pending, statuses, statuses.len() as u8, &mut rng)
            .map(|(index, assigned)| (index, assigned.elevator_id))
    }

    #[test]
    fn nothing_pending_means_no_assignment() {
        let statuses = [status(1, 1, Direction::Idle)];
        assert_eq!(assigned_to(&[], &statuses), None);
    }

    #[test]
    fn moving_match_beats_idle_match() {
        let statuses = [status(1, 4, Direction::Idle), status(2, 2, Direction::Up)];
        let pending = [request(1, 4, Direction::Up, 8)];
        assert_eq!(assigned_to(&pending, &statuses), Some((0, 2)));
    }

    #[test]
    fn moving_match_needs_the_car_behind_the_caller() {
        let statuses = [
            status(1, 1, Direction::Idle),
            status(2, 6, Direction::Up),
            status(3, 3, Direction::Down),
        ];
        let pending = [request(1, 5, Direction::Up, 8)];
        // Car 2 has already passed floor 5 and car 3 is going the other way.
        assert_eq!(assigned_to(&pending, &statuses), Some((0, 1)));

        let pending = [request(2, 2, Direction::Down, 1)];
        assert_eq!(assigned_to(&pending, &statuses), Some((0, 3)));
    }

    #[test]
    fn closest_moving_car_wins_and_ties_go_to_the_lowest_id() {
        let statuses = [
            status(1, 1, Direction::Up),
            status(2, 4, Direction::Up),
            status(3, 4, Direction::Up),
        ];
        let pending = [request(1, 6, Direction::Up, 9)];
        assert_eq!(assigned_to(&pending, &statuses), Some((0, 2)));
    }

    #[test]
    fn first_car_serves_while_everyone_is_idle() {
        let statuses = [
            status(1, 1, Direction::Idle),
            status(2, 9, Direction::Idle),
            status(3, 10, Direction::Idle),
        ];
        let pending = [request(1, 10, Direction::Down, 2)];
        assert_eq!(assigned_to(&pending, &statuses), Some((0, 1)));
    }

    #[test]
    fn closest_idle_car_serves_otherwise() {
        let statuses = [
            status(1, 9, Direction::Down),
            status(2, 2, Direction::Idle),
            status(3, 7, Direction::Idle),
        ];
        let pending = [request(1, 6, Direction::Up, 8)];
        assert_eq!(assigned_to(&pending, &statuses), Some((0, 3)));
    }

    #[test]
    fn faulted_cars_are_passed_over() {
        let mut stuck = status(1, 2, Direction::Up);
        stuck.state = ElevatorStateKind::ElevatorStuck;
        let mut doors = status(2, 3, Direction::Up);
        doors.fault = Some(Fault::DoorsStuck);
        let statuses = [stuck, doors, status(3, 8, Direction::Idle)];
        let pending = [request(1, 5, Direction::Up, 9)];
        assert_eq!(assigned_to(&pending, &statuses), Some((0, 3)));
    }

    #[test]
    fn later_request_with_a_moving_match_goes_first() {
        let statuses = [status(1, 8, Direction::Down), status(2, 3, Direction::Down)];
        let pending = [request(1, 9, Direction::Up, 10), request(2, 2, Direction::Down, 1)];
        assert_eq!(assigned_to(&pending, &statuses), Some((1, 2)));
    }

    #[test]
    fn random_fallback_takes_the_oldest_request() {
        let statuses = [
            status(1, 8, Direction::Down),
            status(2, 9, Direction::Down),
            status(3, 7, Direction::Down),
        ];
        let pending = [request(1, 9, Direction::Up, 10), request(2, 10, Direction::Up, 11)];

        let mut rng = StdRng::seed_from_u64(42);
        let (index, assigned) = find_best_assignment(&pending, &statuses, 3, &mut rng).unwrap();

        let expected = StdRng::seed_from_u64(42).gen_range(1..=3u8);
        assert_eq!(index, 0);
        assert_eq!(assigned.request, pending[0]);
        assert_eq!(assigned.elevator_id, expected);
    }
}
