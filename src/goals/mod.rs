mod lifecycle;

pub use lifecycle::{build_goal, evaluate, GoalDraft};
