pub mod autoannotate;
pub mod persistence;
