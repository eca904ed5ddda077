pub mod event;
pub mod level;
pub mod movement;
pub mod step;
pub mod title;
pub mod world;
