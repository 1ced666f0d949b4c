pub mod hint;
pub mod matching;
pub mod puzzle;
pub mod region;
pub mod session;
