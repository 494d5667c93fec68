pub mod allocation;
pub mod button;
pub mod debounce;
pub mod decimal;
pub mod input_field;
pub mod instruction;
pub mod resolver;
