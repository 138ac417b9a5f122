pub mod form_steps;
