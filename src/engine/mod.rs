pub mod distractor;
