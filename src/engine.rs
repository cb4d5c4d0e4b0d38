use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng};
use tracing::{debug, info, trace, warn};

use crate::{
    canvas::Canvas,
    error::{Error, Result},
    evaluator::Evaluator,
    models::drawing::{Drawing, Mutation},
    observer::Observer,
    settings::Settings,
    utils::Rasterizer,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// generations attempted
    pub generated: u64,
    /// generations that strictly improved the best difference
    pub improvements: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub generation: u64,
    pub mutation: Mutation,
    pub difference: u64,
    pub accepted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    GenerationBudget,
    TimeBudget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub generations: u64,
    pub improvements: u64,
    pub best_difference: u64,
    pub fitness: f64,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
}

/// Greedy (1+1) hill climber over a fixed-size drawing.
///
/// `working` is mutated in place every generation. When the render scores strictly
/// better, the touched slots are copied into `best`; otherwise they are copied back
/// from `best`, so after every step the two drawings are identical again.
pub struct Engine<R = StdRng> {
    evaluator: Evaluator,
    best: Drawing,
    working: Drawing,
    best_difference: u64,
    test_canvas: Canvas,
    rasterizer: Rasterizer,
    rng: R,
    observers: Vec<Box<dyn Observer>>,
    stats: Stats,
    generation_budget: u64,
    time_budget: Option<Duration>,
    progress_interval: u64,
}

impl<R: Rng> Engine<R> {
    /// Starts from a random drawing sized by `settings`.
    pub fn new(goal: Canvas, settings: &Settings, mut rng: R) -> Result<Engine<R>> {
        settings.validate()?;
        check_goal(&goal)?;
        let drawing = Drawing::new_random(
            &mut rng,
            settings.num_polygons,
            settings.num_points,
            goal.width(),
            goal.height(),
        );
        Engine::with_drawing(goal, settings, drawing, rng)
    }

    /// Starts from a given drawing, e.g. one loaded from a previous run.
    pub fn with_drawing(
        goal: Canvas,
        settings: &Settings,
        drawing: Drawing,
        rng: R,
    ) -> Result<Engine<R>> {
        settings.validate()?;
        drawing.check_shape(settings.num_polygons, settings.num_points)?;
        check_goal(&goal)?;

        let mut test_canvas = Canvas::new(goal.width(), goal.height());
        let mut rasterizer = Rasterizer::new();
        let evaluator = Evaluator::new(goal);
        drawing.draw(&mut test_canvas, &mut rasterizer);
        let best_difference = evaluator.difference(&test_canvas)?;

        info!(
            "engine ready: {}x{}, {} polygons x {} points, initial fitness {:.6}%",
            test_canvas.width(),
            test_canvas.height(),
            settings.num_polygons,
            settings.num_points,
            evaluator.fitness_percent(best_difference)
        );

        Ok(Engine {
            working: drawing.clone(),
            best: drawing,
            best_difference,
            test_canvas,
            rasterizer,
            evaluator,
            rng,
            observers: Vec::new(),
            stats: Stats::default(),
            generation_budget: settings.generation_budget,
            time_budget: settings.time_budget(),
            progress_interval: settings.progress_interval,
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// One generation: mutate, render, score, then accept or roll back.
    pub fn step(&mut self) -> Result<GenerationReport> {
        let generation = self.stats.generated;
        let (w, h) = (
            self.test_canvas.width() as f64,
            self.test_canvas.height() as f64,
        );

        let mutation = self.working.mutate(&mut self.rng, w, h);
        self.working
            .draw(&mut self.test_canvas, &mut self.rasterizer);
        let difference = self.evaluator.difference(&self.test_canvas)?;

        let accepted = difference < self.best_difference;
        if accepted {
            self.best.copy_slots_from(&self.working, mutation.touched);
            self.best_difference = difference;
            self.stats.improvements += 1;
            debug!(
                "generation {}: improved to {} via {:?}",
                generation, difference, mutation.kind
            );
        } else {
            self.working.copy_slots_from(&self.best, mutation.touched);
        }
        trace!(
            "generation {}: {:?} -> {} ({})",
            generation,
            mutation,
            difference,
            if accepted { "kept" } else { "rolled back" }
        );

        for observer in &mut self.observers {
            if let Err(e) = observer.observe(&self.test_canvas, generation) {
                warn!("observer failed at generation {}: {:#}", generation, e);
            }
        }

        self.stats.generated += 1;
        if self.stats.generated % self.progress_interval == 0 {
            info!(
                "Step = {}/{} Fitness = {:.6}%",
                self.stats.improvements,
                self.stats.generated,
                self.fitness()
            );
        }

        Ok(GenerationReport {
            generation,
            mutation,
            difference,
            accepted,
        })
    }

    /// Steps until the generation budget or the time budget runs out.
    pub fn run(&mut self) -> Result<RunSummary> {
        let t0 = Instant::now();
        let stop_reason = loop {
            if self.stats.generated >= self.generation_budget {
                break StopReason::GenerationBudget;
            }
            if self.time_budget.is_some_and(|budget| t0.elapsed() > budget) {
                break StopReason::TimeBudget;
            }
            self.step()?;
        };

        let summary = RunSummary {
            generations: self.stats.generated,
            improvements: self.stats.improvements,
            best_difference: self.best_difference,
            fitness: self.fitness(),
            elapsed: t0.elapsed(),
            stop_reason,
        };
        info!(
            "finished ({:?}) after {} generations, {} improvements, fitness {:.6}%",
            summary.stop_reason, summary.generations, summary.improvements, summary.fitness
        );
        Ok(summary)
    }

    pub fn fitness(&self) -> f64 {
        self.evaluator.fitness_percent(self.best_difference)
    }

    pub fn best(&self) -> &Drawing {
        &self.best
    }

    pub fn working(&self) -> &Drawing {
        &self.working
    }

    pub fn best_difference(&self) -> u64 {
        self.best_difference
    }

    pub fn baseline(&self) -> u64 {
        self.evaluator.baseline()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn goal(&self) -> &Canvas {
        self.evaluator.goal()
    }

    /// Renders `best` into a new canvas.
    pub fn render_best(&mut self) -> Canvas {
        let goal = self.evaluator.goal();
        let mut canvas = Canvas::new(goal.width(), goal.height());
        self.best.draw(&mut canvas, &mut self.rasterizer);
        canvas
    }

    pub fn into_best(self) -> Drawing {
        self.best
    }
}

fn check_goal(goal: &Canvas) -> Result<()> {
    if goal.width() == 0 || goal.height() == 0 {
        return Err(Error::EmptyImage {
            width: goal.width(),
            height: goal.height(),
        });
    }
    Ok(())
}
