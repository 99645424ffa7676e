mod align;
mod annotation;
mod corpus;
mod output;
mod run;

pub use run::run;
