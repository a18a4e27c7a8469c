pub mod brave;

pub use brave::BraveNewsProvider;
