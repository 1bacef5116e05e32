/// States that the store manages itself. Models cannot be removed from
/// them and they are hidden from state listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedModelState {
    Deleted,
}

impl ReservedModelState {
    pub const ALL: [ReservedModelState; 1] = [ReservedModelState::Deleted];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedModelState::Deleted => "modelstore-deleted",
        }
    }
}

pub fn is_reserved_state(state_name: &str) -> bool {
    ReservedModelState::ALL
        .iter()
        .any(|state| state.as_str() == state_name)
}

pub fn is_valid_state_name(state_name: &str) -> bool {
    if state_name.chars().count() < 3 {
        return false;
    }
    if state_name.contains('/') || state_name.contains('\\') {
        return false;
    }
    !is_reserved_state(state_name)
}
