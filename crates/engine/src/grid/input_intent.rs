use super::geometry::Direction;

pub const DEFAULT_HOLD_THRESHOLD_SECONDS: f32 = 0.2;

/// Directional key state for one tick, already reduced to edges and holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalInput {
    pub just_pressed: Option<Direction>,
    pub any_just_released: bool,
    pub any_held: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    Walk(Direction),
    Turn(Direction),
}

/// Turns press/hold/release edges into walk-or-turn decisions.
///
/// A tap shorter than the hold threshold turns the actor in place; holding past the
/// threshold keeps requesting steps every tick until release.
#[derive(Debug, Clone)]
pub struct InputIntent {
    direction: Option<Direction>,
    hold_time: f32,
    hold_threshold: f32,
}

impl Default for InputIntent {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_THRESHOLD_SECONDS)
    }
}

impl InputIntent {
    pub fn new(hold_threshold: f32) -> Self {
        Self {
            direction: None,
            hold_time: 0.0,
            hold_threshold,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn hold_time(&self) -> f32 {
        self.hold_time
    }

    pub fn hold_threshold(&self) -> f32 {
        self.hold_threshold
    }

    pub fn update(
        &mut self,
        input: DirectionalInput,
        dt_seconds: f32,
        actor_moving: bool,
    ) -> Vec<MoveIntent> {
        if let Some(direction) = input.just_pressed {
            self.direction = Some(direction);
        }

        let mut intents = Vec::new();
        if actor_moving {
            return intents;
        }

        if input.any_just_released {
            if let Some(direction) = self.direction {
                if self.hold_time > self.hold_threshold {
                    intents.push(MoveIntent::Walk(direction));
                } else {
                    intents.push(MoveIntent::Turn(direction));
                }
            }
            self.hold_time = 0.0;
        }

        if input.any_held {
            self.hold_time += dt_seconds;
            if self.hold_time > self.hold_threshold {
                if let Some(direction) = self.direction {
                    intents.push(MoveIntent::Walk(direction));
                }
            }
        }

        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(direction: Direction) -> DirectionalInput {
        DirectionalInput {
            just_pressed: Some(direction),
            any_just_released: false,
            any_held: true,
        }
    }

    fn hold() -> DirectionalInput {
        DirectionalInput {
            just_pressed: None,
            any_just_released: false,
            any_held: true,
        }
    }

    fn release() -> DirectionalInput {
        DirectionalInput {
            just_pressed: None,
            any_just_released: true,
            any_held: false,
        }
    }

    #[test]
    fn short_tap_turns_in_place() {
        let mut intent = InputIntent::default();
        assert!(intent.update(press(Direction::Left), 0.05, false).is_empty());
        assert!(intent.update(hold(), 0.05, false).is_empty());

        let intents = intent.update(release(), 0.05, false);
        assert_eq!(intents, vec![MoveIntent::Turn(Direction::Left)]);
        assert_eq!(intent.hold_time(), 0.0);
    }

    #[test]
    fn holding_past_threshold_walks_every_tick() {
        let mut intent = InputIntent::default();
        intent.update(press(Direction::Up), 0.1, false);
        assert!(intent.update(hold(), 0.1, false).is_empty());

        assert_eq!(
            intent.update(hold(), 0.1, false),
            vec![MoveIntent::Walk(Direction::Up)]
        );
        assert_eq!(
            intent.update(hold(), 0.1, false),
            vec![MoveIntent::Walk(Direction::Up)]
        );
    }

    #[test]
    fn release_after_long_hold_walks_and_resets() {
        let mut intent = InputIntent::default();
        intent.update(press(Direction::Down), 0.15, false);
        intent.update(hold(), 0.15, false);

        assert_eq!(
            intent.update(release(), 0.15, false),
            vec![MoveIntent::Walk(Direction::Down)]
        );
        assert_eq!(intent.hold_time(), 0.0);
    }

    #[test]
    fn moving_actor_freezes_hold_accumulation_but_tracks_direction() {
        let mut intent = InputIntent::default();
        intent.update(press(Direction::Right), 0.1, false);

        assert!(intent.update(press(Direction::Up), 0.5, true).is_empty());
        assert_eq!(intent.direction(), Some(Direction::Up));
        assert!((intent.hold_time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn release_without_any_press_is_ignored() {
        let mut intent = InputIntent::default();
        assert!(intent.update(release(), 0.1, false).is_empty());
        assert_eq!(intent.direction(), None);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let mut intent = InputIntent::new(0.5);
        intent.update(press(Direction::Left), 0.3, false);
        assert_eq!(
            intent.update(release(), 0.0, false),
            vec![MoveIntent::Turn(Direction::Left)]
        );
    }
}
