pub mod authoring;
pub mod gameplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Authoring,
    Gameplay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    None,
    Navigate(Screen),
    Exit,
}
