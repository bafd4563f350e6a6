use std::rc::Rc;
use yew::prelude::*;

/// A stage shown in the "Generating Mock API" card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationStep {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const STEPS: [GenerationStep; 5] = [
    GenerationStep { id: "analyze", title: "Analyzing Requirements", description: "Understanding your API requirements..." },
    GenerationStep { id: "design", title: "Designing Endpoints", description: "Creating RESTful endpoint structure..." },
    GenerationStep { id: "schema", title: "Generating Schemas", description: "Creating data models and validation rules..." },
    GenerationStep { id: "mock-data", title: "Generating Mock Data", description: "Creating realistic sample responses..." },
    GenerationStep { id: "finalize", title: "Finalizing API", description: "Preparing endpoints for use..." },
];

/// Milliseconds between ticks while a generation is in flight.
pub const TICK_MS: u32 = 400;
const STEP_INCREMENT: u8 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepState {
    pub progress: u8,
    pub completed: bool,
}

/// Simulated progress. The backend reports nothing until it is done, so the
/// ticker walks the steps and parks on the last one at less than 100%.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationProgress {
    pub current: usize,
    pub steps: [StepState; 5],
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self { current: 0, steps: [StepState::default(); 5] }
    }
}

impl GenerationProgress {
    pub fn tick(&mut self) {
        let last = STEPS.len() - 1;
        let step = &mut self.steps[self.current];
        if self.current == last {
            step.progress = (step.progress + STEP_INCREMENT).min(90);
            return;
        }

        step.progress = (step.progress + STEP_INCREMENT).min(100);
        if step.progress == 100 {
            step.completed = true;
            self.current += 1;
        }
    }

    pub fn overall(&self) -> u8 {
        let sum: u32 = self.steps.iter().map(|s| u32::from(s.progress)).sum();
        (sum / STEPS.len() as u32) as u8
    }

    pub fn current_step(&self) -> &'static GenerationStep {
        &STEPS[self.current]
    }
}

pub enum ProgressAction {
    Reset,
    Tick,
}

impl Reducible for GenerationProgress {
    type Action = ProgressAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            ProgressAction::Reset => Rc::new(Self::default()),
            ProgressAction::Tick => {
                let mut next = (*self).clone();
                next.tick();
                Rc::new(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_steps_in_order() {
        let mut p = GenerationProgress::default();
        assert_eq!(p.current_step().id, "analyze");
        for _ in 0..10 {
            p.tick();
        }
        assert!(p.steps[0].completed);
        assert_eq!(p.current_step().id, "design");
        assert_eq!(p.overall(), 20);
    }

    #[test]
    fn never_reports_completion_on_its_own() {
        let mut p = GenerationProgress::default();
        for _ in 0..500 {
            p.tick();
        }
        assert_eq!(p.current_step().id, "finalize");
        assert!(!p.steps[4].completed);
        assert!(p.overall() < 100);
    }

    #[test]
    fn reset_starts_over() {
        let p = Rc::new(GenerationProgress::default())
            .reduce(ProgressAction::Tick)
            .reduce(ProgressAction::Tick);
        assert_eq!(p.steps[0].progress, 20);
        let p = p.reduce(ProgressAction::Reset);
        assert_eq!(*p, GenerationProgress::default());
    }
}
