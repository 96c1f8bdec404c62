pub mod british_dressage;
pub mod british_showjumping;
