mod options;
mod trainer;

pub use options::TrainingOptions;
pub(crate) use trainer::run;
