pub mod audio;
pub mod images;
pub mod schedule;
pub mod settings;
