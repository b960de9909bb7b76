pub mod directions;
pub mod health;
pub mod locations;
pub mod predictions;
