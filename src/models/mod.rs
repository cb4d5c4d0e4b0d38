pub mod color;
pub mod drawing;
pub mod line;
pub mod point;
pub mod polygon;

/// Whether a mutation nudges the current value or replaces it outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Refine,
    Randomize,
}
