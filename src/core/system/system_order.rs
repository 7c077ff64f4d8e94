//! Central system ordering labels to make the per-frame sequence explicit.
//! Stages (chained within `Update`):
//! 1. Input (window resize, toggle presses, settling finished runs)
//! 2. Animate (one driver tick: spawn, integrate, retire, present)
//! 3. Mirror (Bevy entities and the theme marker catch up with the model)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum FlightSet {
    Input,
    Animate,
    Mirror,
}
