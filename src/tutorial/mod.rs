pub mod pages;

pub use pages::{Tutorial, TutorialNavigator, TutorialPage, WELCOME_TEXT};
