use std::fmt;

use super::geometry::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Walk,
    Turn,
    Idle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CharacterAnimation {
    #[default]
    IdleDown,
    IdleUp,
    IdleLeft,
    IdleRight,
    TurnDown,
    TurnUp,
    TurnLeft,
    TurnRight,
    WalkDown,
    WalkUp,
    WalkLeft,
    WalkRight,
}

impl CharacterAnimation {
    pub const fn name(self) -> &'static str {
        match self {
            CharacterAnimation::IdleDown => "idle_down",
            CharacterAnimation::IdleUp => "idle_up",
            CharacterAnimation::IdleLeft => "idle_left",
            CharacterAnimation::IdleRight => "idle_right",
            CharacterAnimation::TurnDown => "turn_down",
            CharacterAnimation::TurnUp => "turn_up",
            CharacterAnimation::TurnLeft => "turn_left",
            CharacterAnimation::TurnRight => "turn_right",
            CharacterAnimation::WalkDown => "walk_down",
            CharacterAnimation::WalkUp => "walk_up",
            CharacterAnimation::WalkLeft => "walk_left",
            CharacterAnimation::WalkRight => "walk_right",
        }
    }

    pub const fn kind(self) -> AnimationKind {
        match self {
            CharacterAnimation::IdleDown
            | CharacterAnimation::IdleUp
            | CharacterAnimation::IdleLeft
            | CharacterAnimation::IdleRight => AnimationKind::Idle,
            CharacterAnimation::TurnDown
            | CharacterAnimation::TurnUp
            | CharacterAnimation::TurnLeft
            | CharacterAnimation::TurnRight => AnimationKind::Turn,
            CharacterAnimation::WalkDown
            | CharacterAnimation::WalkUp
            | CharacterAnimation::WalkLeft
            | CharacterAnimation::WalkRight => AnimationKind::Walk,
        }
    }

    pub const fn facing(self) -> Direction {
        match self {
            CharacterAnimation::IdleDown
            | CharacterAnimation::TurnDown
            | CharacterAnimation::WalkDown => Direction::Down,
            CharacterAnimation::IdleUp | CharacterAnimation::TurnUp | CharacterAnimation::WalkUp => {
                Direction::Up
            }
            CharacterAnimation::IdleLeft
            | CharacterAnimation::TurnLeft
            | CharacterAnimation::WalkLeft => Direction::Left,
            CharacterAnimation::IdleRight
            | CharacterAnimation::TurnRight
            | CharacterAnimation::WalkRight => Direction::Right,
        }
    }
}

impl fmt::Display for CharacterAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const fn animation_for(direction: Direction, kind: AnimationKind) -> CharacterAnimation {
    match (kind, direction) {
        (AnimationKind::Idle, Direction::Down) => CharacterAnimation::IdleDown,
        (AnimationKind::Idle, Direction::Up) => CharacterAnimation::IdleUp,
        (AnimationKind::Idle, Direction::Left) => CharacterAnimation::IdleLeft,
        (AnimationKind::Idle, Direction::Right) => CharacterAnimation::IdleRight,
        (AnimationKind::Turn, Direction::Down) => CharacterAnimation::TurnDown,
        (AnimationKind::Turn, Direction::Up) => CharacterAnimation::TurnUp,
        (AnimationKind::Turn, Direction::Left) => CharacterAnimation::TurnLeft,
        (AnimationKind::Turn, Direction::Right) => CharacterAnimation::TurnRight,
        (AnimationKind::Walk, Direction::Down) => CharacterAnimation::WalkDown,
        (AnimationKind::Walk, Direction::Up) => CharacterAnimation::WalkUp,
        (AnimationKind::Walk, Direction::Left) => CharacterAnimation::WalkLeft,
        (AnimationKind::Walk, Direction::Right) => CharacterAnimation::WalkRight,
    }
}

pub trait AnimationSink {
    fn play(&mut self, animation: CharacterAnimation);
}

impl AnimationSink for Vec<CharacterAnimation> {
    fn play(&mut self, animation: CharacterAnimation) {
        self.push(animation);
    }
}

/// Remembers what is on screen so the sink only hears about changes.
#[derive(Debug, Clone, Default)]
pub struct AnimationIntentRouter {
    current: CharacterAnimation,
}

impl AnimationIntentRouter {
    pub fn current(&self) -> CharacterAnimation {
        self.current
    }

    /// Resolves `kind` against the facing direction. With no facing yet the current
    /// animation is left alone.
    pub fn route(
        &mut self,
        kind: AnimationKind,
        direction: Option<Direction>,
    ) -> Option<CharacterAnimation> {
        let next = animation_for(direction?, kind);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_has_twelve_distinct_names() {
        let kinds = [AnimationKind::Walk, AnimationKind::Turn, AnimationKind::Idle];
        let mut names = Vec::new();
        for kind in kinds {
            for direction in Direction::ALL {
                let animation = animation_for(direction, kind);
                assert_eq!(animation.kind(), kind);
                assert_eq!(animation.facing(), direction);
                names.push(animation.name());
            }
        }
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
        assert_eq!(animation_for(Direction::Left, AnimationKind::Walk).name(), "walk_left");
    }

    #[test]
    fn router_only_reports_changes() {
        let mut router = AnimationIntentRouter::default();
        assert_eq!(router.current(), CharacterAnimation::IdleDown);

        assert_eq!(
            router.route(AnimationKind::Idle, Some(Direction::Down)),
            None
        );
        assert_eq!(
            router.route(AnimationKind::Walk, Some(Direction::Down)),
            Some(CharacterAnimation::WalkDown)
        );
        assert_eq!(
            router.route(AnimationKind::Walk, Some(Direction::Down)),
            None
        );
        assert_eq!(
            router.route(AnimationKind::Idle, Some(Direction::Down)),
            Some(CharacterAnimation::IdleDown)
        );
    }

    #[test]
    fn router_ignores_requests_without_facing() {
        let mut router = AnimationIntentRouter::default();
        assert_eq!(router.route(AnimationKind::Turn, None), None);
        assert_eq!(router.current(), CharacterAnimation::IdleDown);
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<CharacterAnimation> = Vec::new();
        sink.play(CharacterAnimation::TurnLeft);
        sink.play(CharacterAnimation::IdleLeft);
        assert_eq!(
            sink,
            vec![CharacterAnimation::TurnLeft, CharacterAnimation::IdleLeft]
        );
    }
}
