pub mod entity;
pub mod growth;
pub mod kind;
pub mod motion;
pub mod registry;
pub mod rules;
