use std::fmt;

/// One row of a transition table. `to: None` ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S, O> {
    pub from: S,
    pub outcome: O,
    pub to: Option<S>,
}

impl<S, O> Transition<S, O> {
    pub const fn new(from: S, outcome: O, to: Option<S>) -> Self {
        Self { from, outcome, to }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsmError<S, O> {
    pub from: S,
    pub outcome: O,
}

impl<S: fmt::Debug, O: fmt::Debug> fmt::Display for FsmError<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no transition from {:?} on {:?}", self.from, self.outcome)
    }
}

impl<S: fmt::Debug, O: fmt::Debug> std::error::Error for FsmError<S, O> {}

/// A driver with one handler per state.
pub trait Machine {
    type State: Copy + Eq + fmt::Debug;
    type Outcome: Copy + Eq + fmt::Debug;

    fn handle(&mut self, state: Self::State) -> Self::Outcome;

    fn on_transition(
        &mut self,
        _from: Self::State,
        _outcome: Self::Outcome,
        _to: Option<Self::State>,
    ) {
    }
}

pub fn next_state<S: Copy + Eq, O: Copy + Eq>(
    table: &[Transition<S, O>],
    from: S,
    outcome: O,
) -> Result<Option<S>, FsmError<S, O>> {
    table
        .iter()
        .find(|t| t.from == from && t.outcome == outcome)
        .map(|t| t.to)
        .ok_or(FsmError { from, outcome })
}

/// Run handlers from `start` until a transition leads nowhere.
pub fn run<M: Machine>(
    machine: &mut M,
    table: &[Transition<M::State, M::Outcome>],
    start: M::State,
) -> Result<(), FsmError<M::State, M::Outcome>> {
    let mut state = start;
    loop {
        let outcome = machine.handle(state);
        let next = next_state(table, state, outcome)?;
        machine.on_transition(state, outcome, next);
        match next {
            Some(to) => state = to,
            None => return Ok(()),
        }
    }
}
