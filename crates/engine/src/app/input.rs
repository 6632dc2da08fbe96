/// Held movement intents sampled every frame, plus quit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

impl InputAction {
    const COUNT: usize = 5;

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    held: [bool; InputAction::COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, held: bool) {
        self.held[action.index()] = held;
    }

    fn is_down(&self, action: InputAction) -> bool {
        self.held[action.index()]
    }
}

/// What the session sees each tick: held actions plus the one-frame
/// edges for camera retargeting and map regeneration. Edges are
/// consumed by the snapshot that reports them.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    follow_player_pressed: bool,
    follow_enemy_pressed: bool,
    regenerate_pressed: bool,
}

impl InputSnapshot {
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        follow_player_pressed: bool,
        follow_enemy_pressed: bool,
        regenerate_pressed: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            follow_player_pressed,
            follow_enemy_pressed,
            regenerate_pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn follow_player_pressed(&self) -> bool {
        self.follow_player_pressed
    }

    pub fn follow_enemy_pressed(&self) -> bool {
        self.follow_enemy_pressed
    }

    pub fn regenerate_pressed(&self) -> bool {
        self.regenerate_pressed
    }

    pub fn with_action(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self
    }

    pub fn with_follow_player(mut self) -> Self {
        self.follow_player_pressed = true;
        self
    }

    pub fn with_follow_enemy(mut self) -> Self {
        self.follow_enemy_pressed = true;
        self
    }

    pub fn with_regenerate(mut self) -> Self {
        self.regenerate_pressed = true;
        self
    }
}
